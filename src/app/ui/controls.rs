use eframe::egui::{self, Ui, Vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::content::{EntityKind, GraphFilter};

use super::super::{FitState, RootSelection, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Root entity")
            .on_hover_text("Fuzzy search across all titles and ids.");
        ui.text_edit_singleline(&mut self.search);

        let query = self.search.trim().to_owned();
        if !query.is_empty() {
            let matcher = SkimMatcherV2::default();
            let mut matches = self
                .store
                .iter()
                .filter_map(|entity| {
                    matcher
                        .fuzzy_match(&entity.title, &query)
                        .or_else(|| matcher.fuzzy_match(&entity.id, &query))
                        .map(|score| (score, entity.key(), entity.title.clone()))
                })
                .collect::<Vec<_>>();
            matches.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
            matches.truncate(12);

            egui::ScrollArea::vertical()
                .id_salt("root_matches")
                .max_height(190.0)
                .show(ui, |ui| {
                    for (_score, key, title) in matches {
                        let is_current = self.root == RootSelection::Entity(key.clone());
                        let label = format!("{title}  ({})", key.kind.label());
                        if ui.selectable_label(is_current, label).clicked() {
                            self.set_root(RootSelection::Entity(key));
                            self.search.clear();
                        }
                    }
                });
        }

        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            for kind in EntityKind::ALL {
                let is_current = self.root == RootSelection::AllOfKind(kind);
                if ui
                    .selectable_label(is_current, format!("All {}", kind.category_slug()))
                    .clicked()
                {
                    self.set_root(RootSelection::AllOfKind(kind));
                }
            }
        });

        ui.separator();

        let depth_slider = ui
            .add(egui::Slider::new(&mut self.depth, 1..=4).text("Traversal depth"))
            .on_hover_text("How many relationship hops to expand from the root.");
        if depth_slider.changed() {
            self.graph_dirty = true;
        }

        ui.separator();

        ui.label("Show kinds");
        for kind in EntityKind::ALL {
            let mut enabled = self.filter.is_enabled(kind);
            let label = format!("{} ({})", kind.label(), self.store.count(kind));
            if ui.checkbox(&mut enabled, label).changed() {
                self.filter.set_enabled(kind, enabled);
                self.graph_dirty = true;
            }
        }

        let mut min_connections = self.filter.min_connections;
        let threshold_slider = ui
            .add(egui::Slider::new(&mut min_connections, 0..=8).text("Min connections"))
            .on_hover_text("Hide nodes with fewer connections in the resolved graph.");
        if threshold_slider.changed() {
            self.filter.min_connections = min_connections;
            self.graph_dirty = true;
        }

        if ui.button("Reset filters").clicked() && !self.filter.is_neutral() {
            self.filter = GraphFilter::default();
            self.graph_dirty = true;
        }

        ui.separator();

        ui.collapsing("Physics", |ui| {
            let mut changed = false;
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.sim_config.link_distance, 40.0..=220.0)
                        .text("Link distance"),
                )
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut self.sim_config.charge, 400.0..=6000.0).text("Repulsion"))
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.sim_config.center_strength, 0.0..=0.12)
                        .text("Centering"),
                )
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.sim_config.velocity_decay, 0.2..=0.8)
                        .text("Velocity decay"),
                )
                .changed();

            if changed && let Some(render) = self.render.as_mut() {
                *render.sim.config_mut() = self.sim_config;
                render.sim.reheat();
            }
        });

        ui.add_space(4.0);
        if ui.button("Reset view").clicked() {
            self.pan = Vec2::ZERO;
            self.zoom = 1.0;
            self.fit = FitState::Pending;
        }

        if !self.warnings.is_empty() {
            ui.separator();
            ui.collapsing(format!("Content warnings ({})", self.warnings.len()), |ui| {
                for warning in &self.warnings {
                    ui.label(warning.to_string());
                }
            });
        }
    }
}
