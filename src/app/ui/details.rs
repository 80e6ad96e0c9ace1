use eframe::egui::{RichText, Ui};

use crate::content::{EntityDetails, EntityKind, NodeKey};

use super::super::{RootSelection, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        let Some(key) = self.selected.clone() else {
            ui.label("Select a node to inspect it.");
            return;
        };
        let Some(entity) = self.store.get(key.kind, &key.id).cloned() else {
            ui.label(format!("{key} is no longer in the content index."));
            return;
        };

        ui.heading(&entity.title);
        ui.label(
            RichText::new(format!("{} · {}", entity.kind().label(), entity.id)).weak(),
        );
        if !entity.tags.is_empty() {
            ui.horizontal_wrapped(|ui| {
                for tag in &entity.tags {
                    ui.label(RichText::new(format!("#{tag}")).small().weak());
                }
            });
        }

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if ui.button("Make root").clicked() {
                self.set_root(RootSelection::Entity(key.clone()));
            }
            if ui.button("Deselect").clicked() {
                self.selected = None;
            }
        });
        ui.separator();

        match &entity.details {
            EntityDetails::Muscle(details) => {
                if let Some(layer) = &details.layer {
                    ui.label(format!("Layer: {layer}"));
                }
                self.link_section(ui, "Synergists", EntityKind::Muscle, &details.synergists);
                self.link_section(ui, "Antagonists", EntityKind::Muscle, &details.antagonists);
            }
            EntityDetails::Exercise(details) => {
                self.link_section(
                    ui,
                    "Primary muscles",
                    EntityKind::Muscle,
                    &details.primary_muscles,
                );
                self.link_section(
                    ui,
                    "Secondary muscles",
                    EntityKind::Muscle,
                    &details.secondary_muscles,
                );
                self.link_section(ui, "Variations", EntityKind::Exercise, &details.variations);
            }
            EntityDetails::Goal(details) => {
                self.link_section(
                    ui,
                    "Primary exercises",
                    EntityKind::Exercise,
                    &details.primary_exercises,
                );
                self.link_section(
                    ui,
                    "Supportive exercises",
                    EntityKind::Exercise,
                    &details.supportive_exercises,
                );
                self.link_section(
                    ui,
                    "Primary muscles",
                    EntityKind::Muscle,
                    &details.primary_muscles,
                );
                self.link_section(
                    ui,
                    "Secondary muscles",
                    EntityKind::Muscle,
                    &details.secondary_muscles,
                );
                if let Some(pain_id) = details.pain_id.clone() {
                    ui.label(RichText::new("Addresses").strong());
                    self.entity_link(ui, EntityKind::Pain, &pain_id);
                }
            }
            EntityDetails::Pain(details) => {
                if !details.affected_areas.is_empty() {
                    ui.label(RichText::new("Affected areas").strong());
                    for area in details.affected_areas.clone() {
                        ui.horizontal(|ui| {
                            self.entity_link(ui, EntityKind::Muscle, &area.muscle_id);
                            if let Some(intensity) = &area.intensity {
                                ui.label(RichText::new(format!("{intensity} intensity")).weak());
                            }
                        });
                    }
                }
                self.link_section(
                    ui,
                    "Helpful exercises",
                    EntityKind::Exercise,
                    &details.exercise_ids,
                );
            }
        }

        // The index-enriched related lists carry the reverse direction too,
        // so this section shows neighbors the typed fields never mention.
        let related = self
            .store
            .related_entities(key.kind, &key.id)
            .into_owned_groups();
        if !related.iter().all(|(_, group)| group.is_empty()) {
            ui.separator();
            ui.label(RichText::new("Related").strong());
            for (kind, group) in related {
                if group.is_empty() {
                    continue;
                }
                ui.label(RichText::new(kind.label()).weak());
                ui.horizontal_wrapped(|ui| {
                    for (id, title) in group {
                        if ui.link(title).clicked() {
                            self.selected = Some(NodeKey::new(kind, id));
                        }
                    }
                });
            }
        }
    }

    fn link_section(&mut self, ui: &mut Ui, heading: &str, kind: EntityKind, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        ui.label(RichText::new(heading).strong());
        ui.horizontal_wrapped(|ui| {
            for id in ids {
                self.entity_link(ui, kind, id);
            }
        });
        ui.add_space(2.0);
    }

    fn entity_link(&mut self, ui: &mut Ui, kind: EntityKind, id: &str) {
        match self.store.get(kind, id).map(|entity| entity.title_short.clone()) {
            Some(title) => {
                if ui.link(title).clicked() {
                    self.selected = Some(NodeKey::new(kind, id));
                }
            }
            None => {
                ui.label(RichText::new(format!("{id} (missing)")).weak());
            }
        }
    }
}
