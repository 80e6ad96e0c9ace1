mod app;
mod content;
mod sim;
mod util;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the content index produced by the authoring pipeline.
    #[arg(long, default_value = "data/content-index.json")]
    content_index: PathBuf,
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "somagraph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::SomagraphApp::new(
                cc,
                args.content_index.clone(),
            )))
        }),
    )
}
