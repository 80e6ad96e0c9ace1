use std::path::Path;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::content::{EntityKind, EntityStore, GraphFilter};
use crate::sim::SimConfig;

use super::super::{FitState, LoadedContent, RootSelection, ViewModel};

fn default_root(store: &EntityStore) -> RootSelection {
    store
        .all(EntityKind::Goal)
        .next()
        .or_else(|| store.iter().next())
        .map(|entity| RootSelection::Entity(entity.key()))
        .unwrap_or(RootSelection::AllOfKind(EntityKind::Muscle))
}

impl ViewModel {
    pub(in crate::app) fn new(content: LoadedContent) -> Self {
        let root = default_root(&content.store);
        Self {
            store: content.store,
            warnings: content.warnings,
            root,
            depth: 2,
            filter: GraphFilter::default(),
            search: String::new(),
            selected: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            sim_config: SimConfig::default(),
            graph_dirty: true,
            render: None,
            gesture: Default::default(),
            fit: FitState::Pending,
        }
    }

    pub(in crate::app) fn set_root(&mut self, root: RootSelection) {
        if self.root != root {
            self.root = root;
            self.graph_dirty = true;
        }
    }

    fn root_title(&self) -> String {
        match &self.root {
            RootSelection::Entity(key) => self
                .store
                .get(key.kind, &key.id)
                .map(|entity| entity.title.clone())
                .unwrap_or_else(|| key.to_string()),
            RootSelection::AllOfKind(kind) => format!("all {}", kind.category_slug()),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        index_path: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("somagraph");
                    ui.separator();
                    ui.label(format!("root: {}", self.root_title()));
                    ui.label(format!("index: {}", index_path.display()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload content"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(render) = &self.render {
                            ui.label(format!(
                                "{} nodes · {} edges",
                                render.nodes.len(),
                                render.edges.len()
                            ));
                        }
                        let counts = EntityKind::ALL
                            .into_iter()
                            .map(|kind| format!("{} {}", self.store.count(kind), kind))
                            .collect::<Vec<_>>()
                            .join(" · ");
                        ui.label(counts);
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.draw_controls(ui));
            });

        if self.selected.is_some() {
            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(340.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| self.draw_details(ui));
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading content index...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }
}
