use std::collections::HashSet;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2};

use crate::content::GraphFilter;
use crate::sim::SimPhase;
use crate::util::truncate_label;

use super::super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, fit_camera, kind_color,
    relation_color, world_to_screen,
};
use super::super::{FitState, ViewModel};
use super::interaction::GestureEvent;

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        // Zero-size viewport: not ready, nothing steps or draws yet.
        if rect.width() < 1.0 || rect.height() < 1.0 {
            return;
        }
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
            self.fit = FitState::Done;
        }

        let is_empty = self
            .render
            .as_ref()
            .is_none_or(|render| render.nodes.is_empty());
        if is_empty {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No nodes to display",
                FontId::proportional(16.0),
                Color32::from_gray(200),
            );
            if !self.filter.is_neutral() {
                let button_rect =
                    Rect::from_center_size(rect.center() + vec2(0.0, 40.0), vec2(130.0, 28.0));
                if ui.put(button_rect, egui::Button::new("Reset filters")).clicked() {
                    self.filter = GraphFilter::default();
                    self.graph_dirty = true;
                }
            }
            return;
        }

        // Hit testing happens against the positions the user currently sees,
        // so pointer input is translated and applied before this frame's
        // physics step.
        let (screen_positions, screen_radii) = self.screen_space(rect);
        let pointer = ui.input(|input| {
            input
                .pointer
                .interact_pos()
                .or_else(|| input.pointer.latest_pos())
        });
        let hovered = if response.hovered() || response.dragged() {
            Self::hovered_index(pointer, &screen_positions, &screen_radii)
        } else {
            None
        };

        let (pressed, down, released) = ui.input(|input| {
            (
                input.pointer.primary_pressed(),
                input.pointer.primary_down(),
                input.pointer.primary_released(),
            )
        });
        let mut effects = Vec::new();
        if let Some(pos) = pointer {
            if pressed && response.hovered() {
                effects.extend(self.gesture.handle(GestureEvent::Press { pos, node: hovered }));
            } else if released {
                effects.extend(self.gesture.handle(GestureEvent::Release { pos }));
            } else if down {
                effects.extend(self.gesture.handle(GestureEvent::Move { pos }));
            }
        } else if !down {
            self.gesture.reset();
        }
        for effect in effects {
            self.apply_gesture_effect(effect, rect);
        }

        let mut stepping = false;
        if let Some(render) = self.render.as_mut()
            && render.sim.phase() == SimPhase::Running
        {
            render.sim.step();
            stepping = true;
        }
        if stepping || response.dragged() {
            ui.ctx().request_repaint();
        }

        self.update_auto_fit(ui, rect);

        let (screen_positions, screen_radii) = self.screen_space(rect);
        let Some(render) = self.render.as_ref() else {
            return;
        };

        let selected_index = self
            .selected
            .as_ref()
            .and_then(|key| render.index_by_key.get(key).copied());
        let highlight: Option<HashSet<usize>> = hovered.map(|index| {
            let mut set = HashSet::from([index]);
            set.extend(render.neighbors[index].iter().copied());
            set
        });

        let zoom_sqrt = self.zoom.sqrt();
        for edge in &render.edges {
            let start = screen_positions[edge.from];
            let end = screen_positions[edge.to];
            if !circle_visible(rect, start, 4.0) && !circle_visible(rect, end, 4.0) {
                continue;
            }

            let hover_edge = hovered.is_some_and(|h| edge.from == h || edge.to == h);
            let (width, color) = if hover_edge {
                (
                    (2.2 * zoom_sqrt).clamp(1.2, 4.0),
                    Color32::from_rgb(246, 206, 104),
                )
            } else if highlight.is_some() {
                (
                    (0.9 * zoom_sqrt).clamp(0.5, 2.0),
                    Color32::from_rgba_unmultiplied(90, 100, 112, 90),
                )
            } else {
                (
                    (1.2 * zoom_sqrt).clamp(0.6, 3.0),
                    relation_color(edge.relation),
                )
            };
            painter.line_segment([start, end], Stroke::new(width, color));

            if hover_edge || self.zoom > 1.1 {
                let mid = start + (end - start) * 0.5;
                let label_color = if hover_edge {
                    Color32::from_gray(235)
                } else {
                    Color32::from_gray(150)
                };
                painter.text(
                    mid,
                    Align2::CENTER_CENTER,
                    &edge.label,
                    FontId::proportional(10.5),
                    label_color,
                );
            }
        }

        for (index, node) in render.nodes.iter().enumerate() {
            let position = screen_positions[index];
            let radius = screen_radii[index];
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let is_hovered = hovered == Some(index);
            let is_selected = selected_index == Some(index);
            let in_highlight = highlight
                .as_ref()
                .is_some_and(|set| set.contains(&index));

            let base = kind_color(node.key.kind);
            let color = if is_hovered {
                blend_color(base, Color32::WHITE, 0.25)
            } else if highlight.is_some() && !in_highlight {
                dim_color(base, 0.35)
            } else {
                base
            };
            painter.circle_filled(position, radius, color);

            let stroke = if is_selected {
                Stroke::new(2.5, Color32::from_rgb(245, 206, 93))
            } else if node.level == 0 {
                Stroke::new(2.0, Color32::from_gray(235))
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
            };
            painter.circle_stroke(position, radius, stroke);

            let show_label =
                is_hovered || is_selected || in_highlight || self.zoom > 1.1 || radius > 24.0;
            if show_label {
                let label_color = if highlight.is_some() && !in_highlight {
                    Color32::from_gray(120)
                } else {
                    Color32::from_gray(238)
                };
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    truncate_label(&node.label, 24),
                    FontId::proportional(12.0),
                    label_color,
                );
            }
        }

        if let Some(index) = hovered {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
            let node = &render.nodes[index];
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!(
                    "{}  |  {}  |  {} connections",
                    node.label,
                    node.key.kind.label(),
                    node.connections
                ),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }

    fn screen_space(&self, rect: Rect) -> (Vec<Pos2>, Vec<f32>) {
        let mut positions = Vec::new();
        let mut radii = Vec::new();
        if let Some(render) = self.render.as_ref() {
            positions.reserve(render.nodes.len());
            radii.reserve(render.nodes.len());
            for sim_node in render.sim.nodes() {
                positions.push(world_to_screen(rect, self.pan, self.zoom, sim_node.pos));
                radii.push((sim_node.radius * self.zoom.powf(0.40)).clamp(4.0, 60.0));
            }
        }
        (positions, radii)
    }

    /// One-shot camera fit, armed per rebuild and resolved the first time
    /// the layout stabilizes. Animated so the jump is readable.
    fn update_auto_fit(&mut self, ui: &Ui, rect: Rect) {
        match self.fit {
            FitState::Pending => {
                let Some(render) = self.render.as_ref() else {
                    return;
                };
                if render.sim.phase() != SimPhase::Stable {
                    return;
                }
                let circles = render
                    .sim
                    .nodes()
                    .iter()
                    .map(|node| (node.pos, node.radius))
                    .collect::<Vec<_>>();
                self.fit = match fit_camera(rect, &circles) {
                    Some((target_pan, target_zoom)) => FitState::Animating {
                        target_pan,
                        target_zoom,
                    },
                    None => FitState::Done,
                };
                ui.ctx().request_repaint();
            }
            FitState::Animating {
                target_pan,
                target_zoom,
            } => {
                self.pan += (target_pan - self.pan) * 0.18;
                self.zoom += (target_zoom - self.zoom) * 0.18;
                if (target_pan - self.pan).length() < 0.5
                    && (target_zoom - self.zoom).abs() < 0.004
                {
                    self.pan = target_pan;
                    self.zoom = target_zoom;
                    self.fit = FitState::Done;
                } else {
                    ui.ctx().request_repaint();
                }
            }
            FitState::Done => {}
        }
    }
}
