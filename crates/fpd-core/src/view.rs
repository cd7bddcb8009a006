//! Pan/zoom camera over the whole panel.
//!
//! Panel documents store y growing downward while the view draws them
//! with a negated y scale. The camera compensates the flip in its
//! translation so zooming about the pointer keeps the point under it fixed.

use crate::config::EngineConfig;
use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};

/// Scale `k` and translation `(x, y)` of the scene container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub const fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    /// Camera used when a document is shown for the first time: slightly
    /// zoomed out with a margin proportional to the panel size.
    pub fn initial(panel_width: f64, panel_height: f64, config: &EngineConfig) -> Self {
        Self {
            k: config.initial_zoom,
            x: config.initial_margin * panel_width,
            y: -config.initial_margin * panel_height,
        }
    }

    /// Container matrix `[k, 0, 0, -k, x, y + k * scene_height]`.
    pub fn matrix(&self, scene_height: f64) -> Affine {
        Affine::new([self.k, 0.0, 0.0, -self.k, self.x, self.y + self.k * scene_height])
    }

    /// Adopt a camera computed by an external zoom gesture.
    pub fn set(&mut self, k: f64, x: f64, y: f64, config: &EngineConfig) {
        self.k = config.clamp_zoom(k);
        self.x = x;
        self.y = y;
    }

    /// Shift the camera by a screen-pixel delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Multiply the zoom by `factor`, keeping the scene point under
    /// `anchor` (screen pixels) in place. Returns `false` when the zoom
    /// was already pinned at the limit.
    pub fn zoom_about(&mut self, factor: f64, anchor: Point, config: &EngineConfig) -> bool {
        let k = config.clamp_zoom(self.k * factor);
        if k == self.k {
            return false;
        }
        let ratio = k / self.k;
        self.x = anchor.x - (anchor.x - self.x) * ratio;
        self.y = anchor.y - (anchor.y - self.y) * ratio;
        self.k = k;
        true
    }

    /// Decoration size factor for a panel of the given width: wide panels
    /// get proportionally larger markers, and zooming in shrinks them.
    pub fn scale_factor(&self, panel_width: f64) -> f64 {
        if panel_width > 100.0 {
            panel_width / (100.0 * self.k)
        } else {
            1.0 / self.k
        }
    }

    /// `scale_factor` capped at `cap`.
    pub fn decoration_scale(&self, panel_width: f64, cap: f64) -> f64 {
        self.scale_factor(panel_width).min(cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn matrix_flips_y_around_scene_height() {
        let view = ViewTransform::new(2.0, 10.0, 5.0);
        let m = view.matrix(100.0);
        assert_eq!(m.as_coeffs(), [2.0, 0.0, 0.0, -2.0, 10.0, 205.0]);
        // Scene origin lands at the bottom of the flipped container.
        let p = m * Point::new(0.0, 0.0);
        assert!(close(p.x, 10.0) && close(p.y, 205.0));
    }

    #[test]
    fn zoom_about_keeps_anchor_fixed() {
        let config = EngineConfig::default();
        let height = 300.0;
        let mut view = ViewTransform::new(1.0, 20.0, -10.0);
        let anchor = Point::new(150.0, 90.0);
        let scene_pt = view.matrix(height).inverse() * anchor;

        assert!(view.zoom_about(2.5, anchor, &config));
        assert!(close(view.k, 2.5));

        let back = view.matrix(height) * scene_pt;
        assert!(close(back.x, anchor.x), "x drifted: {}", back.x);
        assert!(close(back.y, anchor.y), "y drifted: {}", back.y);
    }

    #[test]
    fn zoom_is_clamped_to_extent() {
        let config = EngineConfig::default();
        let mut view = ViewTransform::new(10.0, 0.0, 0.0);
        assert!(!view.zoom_about(2.0, Point::ZERO, &config));
        assert_eq!(view.k, 10.0);

        view.set(0.01, 3.0, 4.0, &config);
        assert_eq!(view, ViewTransform::new(0.5, 3.0, 4.0));
    }

    #[test]
    fn scale_factor_depends_on_panel_width() {
        let view = ViewTransform::new(2.0, 0.0, 0.0);
        assert!(close(view.scale_factor(50.0), 0.5));
        assert!(close(view.scale_factor(400.0), 2.0));
        let zoomed_out = ViewTransform::new(0.5, 0.0, 0.0);
        assert!(close(zoomed_out.scale_factor(400.0), 8.0));
        assert!(close(zoomed_out.decoration_scale(400.0, 2.0), 2.0));
    }

    #[test]
    fn initial_camera_adds_margin() {
        let view = ViewTransform::initial(1000.0, 500.0, &EngineConfig::default());
        assert!(close(view.k, 0.93));
        assert!(close(view.x, 39.0));
        assert!(close(view.y, -19.5));
    }
}
