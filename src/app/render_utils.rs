use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::content::EntityKind;
use crate::content::model::RelationKind;

pub(super) const ZOOM_MIN: f32 = 0.2;
pub(super) const ZOOM_MAX: f32 = 4.0;
/// Auto-fit never zooms in past this even when the graph is tiny.
pub(super) const FIT_MAX_ZOOM: f32 = 1.5;
pub(super) const FIT_PADDING: f32 = 100.0;

pub(super) fn kind_color(kind: EntityKind) -> Color32 {
    match kind {
        EntityKind::Muscle => Color32::from_rgb(0xff, 0x52, 0x52),
        EntityKind::Exercise => Color32::from_rgb(0x00, 0xd4, 0xff),
        EntityKind::Goal => Color32::from_rgb(0x4c, 0xaf, 0x50),
        EntityKind::Pain => Color32::from_rgb(0xf4, 0x43, 0x36),
    }
}

/// Edge tint by relation semantics, muted so nodes stay the loudest layer.
pub(super) fn relation_color(relation: RelationKind) -> Color32 {
    match relation {
        RelationKind::Affects | RelationKind::Addresses => {
            Color32::from_rgba_unmultiplied(190, 110, 105, 150)
        }
        RelationKind::Targets | RelationKind::Involves => {
            Color32::from_rgba_unmultiplied(120, 150, 175, 150)
        }
        RelationKind::Solution | RelationKind::Requires | RelationKind::Includes => {
            Color32::from_rgba_unmultiplied(115, 165, 120, 150)
        }
        RelationKind::Variation => Color32::from_rgba_unmultiplied(150, 140, 170, 150),
    }
}

/// Node size grows with connectivity, capped so hubs stay clickable rather
/// than swallowing the canvas.
pub(super) fn node_radius(connections: usize) -> f32 {
    (15.0 + connections as f32 * 3.0).min(50.0)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// Camera transform that fits every node circle inside the viewport with a
/// padding margin. Picks the smaller axis scale to preserve aspect ratio.
pub(super) fn fit_camera(rect: Rect, circles: &[(Vec2, f32)]) -> Option<(Vec2, f32)> {
    if circles.is_empty() || rect.width() < 1.0 || rect.height() < 1.0 {
        return None;
    }

    let mut min = Vec2::splat(f32::MAX);
    let mut max = Vec2::splat(f32::MIN);
    for &(pos, radius) in circles {
        min.x = min.x.min(pos.x - radius);
        min.y = min.y.min(pos.y - radius);
        max.x = max.x.max(pos.x + radius);
        max.y = max.y.max(pos.y + radius);
    }

    let padding = FIT_PADDING.min(rect.width() * 0.25).min(rect.height() * 0.25);
    let width = (max.x - min.x).max(1.0);
    let height = (max.y - min.y).max(1.0);
    let scale_x = (rect.width() - padding * 2.0) / width;
    let scale_y = (rect.height() - padding * 2.0) / height;
    let zoom = scale_x.min(scale_y).clamp(ZOOM_MIN, FIT_MAX_ZOOM);

    let center = (min + max) * 0.5;
    Some((-center * zoom, zoom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    #[test]
    fn transforms_round_trip() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let world = vec2(120.0, -45.0);
        let pan = vec2(30.0, -10.0);
        let zoom = 1.7;

        let screen = world_to_screen(rect, pan, zoom, world);
        let back = screen_to_world(rect, pan, zoom, screen);
        assert!((back - world).length() < 0.001);
    }

    #[test]
    fn fit_centers_the_bounding_box() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let circles = vec![(vec2(100.0, 100.0), 15.0), (vec2(300.0, 200.0), 15.0)];

        let (pan, zoom) = fit_camera(rect, &circles).unwrap();
        let center = vec2(200.0, 150.0);
        let screen_center = world_to_screen(rect, pan, zoom, center);
        assert!((screen_center - rect.center()).length() < 0.001);
    }

    #[test]
    fn fit_keeps_nodes_inside_padded_viewport() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let circles = vec![
            (vec2(-400.0, -300.0), 20.0),
            (vec2(400.0, 300.0), 20.0),
            (vec2(0.0, 500.0), 20.0),
        ];

        let (pan, zoom) = fit_camera(rect, &circles).unwrap();
        for &(pos, radius) in &circles {
            let screen = world_to_screen(rect, pan, zoom, pos);
            let screen_radius = radius * zoom;
            assert!(screen.x - screen_radius >= rect.left());
            assert!(screen.x + screen_radius <= rect.right());
            assert!(screen.y - screen_radius >= rect.top());
            assert!(screen.y + screen_radius <= rect.bottom());
        }
    }

    #[test]
    fn fit_never_overzooms_small_graphs() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let circles = vec![(vec2(0.0, 0.0), 15.0), (vec2(10.0, 0.0), 15.0)];

        let (_pan, zoom) = fit_camera(rect, &circles).unwrap();
        assert!(zoom <= FIT_MAX_ZOOM);
    }

    #[test]
    fn fit_rejects_degenerate_viewports() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(0.0, 0.0));
        assert!(fit_camera(rect, &[(Vec2::ZERO, 10.0)]).is_none());
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        assert!(fit_camera(rect, &[]).is_none());
    }
}
