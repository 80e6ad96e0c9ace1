use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::render_utils::{ZOOM_MAX, ZOOM_MIN, screen_to_world};
use super::super::{FitState, ViewModel};

/// A press-release pair whose total pointer travel stays under this many
/// pixels counts as a click, not a drag.
const CLICK_THRESHOLD_PX: f32 = 4.0;

/// Pointer input, already translated out of egui terms: a press lands either
/// on a node or on the background, everything else is movement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum GestureEvent {
    Press { pos: Pos2, node: Option<usize> },
    Move { pos: Pos2 },
    Release { pos: Pos2 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum GestureEffect {
    BeginDrag { node: usize, pos: Pos2 },
    DragTo { node: usize, pos: Pos2 },
    EndDrag { node: usize },
    Click { node: usize },
    PanBy(Vec2),
    ClearSelection,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Gesture {
    #[default]
    Idle,
    DraggingNode {
        node: usize,
        press: Pos2,
        last: Pos2,
    },
    Panning {
        press: Pos2,
        last: Pos2,
    },
}

/// Gesture state machine. Pure: consumes translated events, emits effects,
/// never touches the simulation or camera itself.
#[derive(Default)]
pub(in crate::app) struct GestureMachine {
    state: Gesture,
}

impl GestureMachine {
    pub(in crate::app) fn handle(&mut self, event: GestureEvent) -> Vec<GestureEffect> {
        match (self.state, event) {
            (Gesture::Idle, GestureEvent::Press { pos, node: Some(node) }) => {
                self.state = Gesture::DraggingNode {
                    node,
                    press: pos,
                    last: pos,
                };
                vec![GestureEffect::BeginDrag { node, pos }]
            }
            (Gesture::Idle, GestureEvent::Press { pos, node: None }) => {
                self.state = Gesture::Panning {
                    press: pos,
                    last: pos,
                };
                Vec::new()
            }
            (Gesture::DraggingNode { node, press, .. }, GestureEvent::Move { pos }) => {
                self.state = Gesture::DraggingNode {
                    node,
                    press,
                    last: pos,
                };
                vec![GestureEffect::DragTo { node, pos }]
            }
            (Gesture::Panning { press, last }, GestureEvent::Move { pos }) => {
                self.state = Gesture::Panning { press, last: pos };
                vec![GestureEffect::PanBy(pos - last)]
            }
            (Gesture::DraggingNode { node, press, .. }, GestureEvent::Release { pos }) => {
                self.state = Gesture::Idle;
                let mut effects = vec![GestureEffect::EndDrag { node }];
                if (pos - press).length() < CLICK_THRESHOLD_PX {
                    effects.push(GestureEffect::Click { node });
                }
                effects
            }
            (Gesture::Panning { press, .. }, GestureEvent::Release { pos }) => {
                self.state = Gesture::Idle;
                if (pos - press).length() < CLICK_THRESHOLD_PX {
                    vec![GestureEffect::ClearSelection]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    pub(in crate::app) fn reset(&mut self) {
        self.state = Gesture::Idle;
    }
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(ZOOM_MIN, ZOOM_MAX);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
        self.fit = FitState::Done;
    }

    pub(in crate::app) fn hovered_index(
        pointer: Option<Pos2>,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer = pointer?;
        screen_positions
            .iter()
            .zip(screen_radii)
            .enumerate()
            .filter_map(|(index, (position, radius))| {
                let distance = position.distance(pointer);
                (distance <= *radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub(in crate::app) fn apply_gesture_effect(&mut self, effect: GestureEffect, rect: Rect) {
        match effect {
            GestureEffect::BeginDrag { node, pos } => {
                self.fit = FitState::Done;
                let world = screen_to_world(rect, self.pan, self.zoom, pos);
                if let Some(render) = self.render.as_mut() {
                    render.sim.reheat();
                    render.sim.pin(node, world);
                }
            }
            GestureEffect::DragTo { node, pos } => {
                let world = screen_to_world(rect, self.pan, self.zoom, pos);
                if let Some(render) = self.render.as_mut() {
                    render.sim.pin(node, world);
                }
            }
            GestureEffect::EndDrag { node } => {
                if let Some(render) = self.render.as_mut() {
                    render.sim.release(node);
                    render.sim.reheat();
                }
            }
            GestureEffect::Click { node } => {
                let key = self
                    .render
                    .as_ref()
                    .and_then(|render| render.nodes.get(node))
                    .map(|render_node| render_node.key.clone());
                if let Some(key) = key {
                    self.selected = Some(key);
                }
            }
            GestureEffect::PanBy(delta) => {
                self.pan += delta;
                self.fit = FitState::Done;
            }
            GestureEffect::ClearSelection => {
                self.selected = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn short_press_on_node_is_a_click() {
        let mut machine = GestureMachine::default();
        machine.handle(GestureEvent::Press {
            pos: pos2(100.0, 100.0),
            node: Some(3),
        });
        machine.handle(GestureEvent::Move {
            pos: pos2(101.0, 100.5),
        });
        let effects = machine.handle(GestureEvent::Release {
            pos: pos2(101.0, 100.5),
        });

        assert!(effects.contains(&GestureEffect::EndDrag { node: 3 }));
        assert!(effects.contains(&GestureEffect::Click { node: 3 }));
    }

    #[test]
    fn long_drag_on_node_fires_no_click() {
        let mut machine = GestureMachine::default();
        machine.handle(GestureEvent::Press {
            pos: pos2(100.0, 100.0),
            node: Some(3),
        });
        let drag = machine.handle(GestureEvent::Move {
            pos: pos2(160.0, 140.0),
        });
        assert_eq!(
            drag,
            vec![GestureEffect::DragTo {
                node: 3,
                pos: pos2(160.0, 140.0)
            }]
        );

        let effects = machine.handle(GestureEvent::Release {
            pos: pos2(160.0, 140.0),
        });
        assert_eq!(effects, vec![GestureEffect::EndDrag { node: 3 }]);
    }

    #[test]
    fn background_drag_pans_by_pointer_delta() {
        let mut machine = GestureMachine::default();
        machine.handle(GestureEvent::Press {
            pos: pos2(10.0, 10.0),
            node: None,
        });
        let effects = machine.handle(GestureEvent::Move {
            pos: pos2(25.0, 4.0),
        });
        assert_eq!(
            effects,
            vec![GestureEffect::PanBy(pos2(25.0, 4.0) - pos2(10.0, 10.0))]
        );

        let effects = machine.handle(GestureEvent::Release {
            pos: pos2(25.0, 4.0),
        });
        assert!(effects.is_empty());
    }

    #[test]
    fn background_click_clears_selection() {
        let mut machine = GestureMachine::default();
        machine.handle(GestureEvent::Press {
            pos: pos2(10.0, 10.0),
            node: None,
        });
        let effects = machine.handle(GestureEvent::Release {
            pos: pos2(10.5, 10.0),
        });
        assert_eq!(effects, vec![GestureEffect::ClearSelection]);
    }

    #[test]
    fn stray_events_in_idle_are_ignored() {
        let mut machine = GestureMachine::default();
        assert!(
            machine
                .handle(GestureEvent::Move {
                    pos: pos2(5.0, 5.0)
                })
                .is_empty()
        );
        assert!(
            machine
                .handle(GestureEvent::Release {
                    pos: pos2(5.0, 5.0)
                })
                .is_empty()
        );
    }
}
