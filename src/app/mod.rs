use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};

use crate::content::model::RelationKind;
use crate::content::{
    EntityKind, EntityStore, GraphFilter, LinkWarning, NodeKey, build_link_index,
    load_content_index,
};
use crate::sim::{SimConfig, Simulation};

mod graph;
mod render_utils;
mod ui;

pub struct SomagraphApp {
    index_path: PathBuf,
    state: AppState,
    reload_rx: Option<Receiver<Result<LoadedContent, String>>>,
}

struct LoadedContent {
    store: EntityStore,
    warnings: Vec<LinkWarning>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<LoadedContent, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

/// What the graph is rooted at: a single entity, or the union over every
/// entity of one kind.
#[derive(Clone, Debug, PartialEq, Eq)]
enum RootSelection {
    Entity(NodeKey),
    AllOfKind(EntityKind),
}

struct ViewModel {
    store: EntityStore,
    warnings: Vec<LinkWarning>,
    root: RootSelection,
    depth: usize,
    filter: GraphFilter,
    search: String,
    selected: Option<NodeKey>,
    pan: Vec2,
    zoom: f32,
    sim_config: SimConfig,
    graph_dirty: bool,
    render: Option<RenderGraph>,
    gesture: graph::GestureMachine,
    fit: FitState,
}

/// Camera auto-fit lifecycle: armed on every rebuild, resolved into an
/// animation target the first time the layout stabilizes, and cancelled by
/// any manual pan/zoom.
#[derive(Clone, Copy)]
enum FitState {
    Pending,
    Animating { target_pan: Vec2, target_zoom: f32 },
    Done,
}

struct RenderGraph {
    nodes: Vec<RenderNode>,
    edges: Vec<RenderEdge>,
    index_by_key: HashMap<NodeKey, usize>,
    neighbors: Vec<Vec<usize>>,
    sim: Simulation,
}

struct RenderNode {
    key: NodeKey,
    label: String,
    level: usize,
    connections: usize,
}

struct RenderEdge {
    from: usize,
    to: usize,
    relation: RelationKind,
    label: String,
}

fn load_content(path: &Path) -> anyhow::Result<LoadedContent> {
    let mut store = load_content_index(path)?;
    let warnings = build_link_index(&mut store);
    Ok(LoadedContent { store, warnings })
}

impl SomagraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, index_path: PathBuf) -> Self {
        let state = Self::start_load(index_path.clone());
        Self {
            index_path,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(index_path: PathBuf) -> Receiver<Result<LoadedContent, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_content(&index_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(index_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(index_path),
        }
    }
}

impl eframe::App for SomagraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(content) => AppState::Ready(Box::new(ViewModel::new(content))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading content index...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load content index");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.index_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.index_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.index_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(content) => AppState::Ready(Box::new(ViewModel::new(content))),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
