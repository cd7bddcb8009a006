//! Screen ⇄ scene coordinate conversion.
//!
//! The camera may change between two pointer events (live zooming), so
//! callers convert every event afresh instead of caching an inverse.

use crate::view::ViewTransform;
use kurbo::{Point, Vec2};

/// Map a container-pixel position into scene coordinates.
#[inline]
pub fn screen_to_scene(screen: Point, view: &ViewTransform, scene_height: f64) -> Point {
    view.matrix(scene_height).inverse() * screen
}

/// Map a scene position into container pixels.
#[inline]
pub fn scene_to_screen(scene: Point, view: &ViewTransform, scene_height: f64) -> Point {
    view.matrix(scene_height) * scene
}

/// Convert a screen-pixel delta into a scene delta (y flips).
#[inline]
pub fn screen_delta_to_scene(delta: Vec2, view: &ViewTransform) -> Vec2 {
    Vec2::new(delta.x / view.k, -delta.y / view.k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn identity_camera_only_flips() {
        let view = ViewTransform::IDENTITY;
        let p = screen_to_scene(Point::new(10.0, 0.0), &view, 100.0);
        assert!(close(p, Point::new(10.0, 100.0)));
        let p = screen_to_scene(Point::new(10.0, 100.0), &view, 100.0);
        assert!(close(p, Point::new(10.0, 0.0)));
    }

    #[test]
    fn round_trip_through_zoomed_camera() {
        let view = ViewTransform::new(3.0, -40.0, 12.0);
        let scene = Point::new(17.5, 63.25);
        let screen = scene_to_screen(scene, &view, 250.0);
        assert!(close(screen_to_scene(screen, &view, 250.0), scene));
    }

    #[test]
    fn delta_matches_point_difference() {
        let view = ViewTransform::new(2.0, 5.0, 7.0);
        let a = Point::new(100.0, 100.0);
        let b = Point::new(130.0, 80.0);
        let expected = screen_to_scene(b, &view, 50.0) - screen_to_scene(a, &view, 50.0);
        let got = screen_delta_to_scene(b - a, &view);
        assert!((got.x - expected.x).abs() < 1e-9);
        assert!((got.y - expected.y).abs() < 1e-9);
    }
}
