//! Move and proportional resize of the selected elements.
//!
//! Moves are delta based: each pointer move adds its scene delta to the
//! translation of every selected fragment. Resizes are re-derived from the
//! drag-start snapshot on every move, so rounding never accumulates and a
//! cancelled gesture can be rolled back exactly.

pub use fpd_render::decor::Corner;

use fpd_core::id::ElementId;
use fpd_core::model::{BBox, Scene, translated};
use kurbo::{Affine, Point, Vec2};

// ─── Snapshots ───────────────────────────────────────────────────────────

/// A fragment's transform as it was when a gesture started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentSnapshot {
    /// Position of the fragment in `Scene::elements`.
    pub index: usize,
    pub id: ElementId,
    pub transform: Affine,
    /// Centre of the fragment's local box.
    pub local_center: Point,
}

/// Capture every non-panel fragment of `ids`.
pub fn snapshot(scene: &Scene, ids: &[ElementId]) -> Vec<FragmentSnapshot> {
    ids.iter()
        .flat_map(|&id| scene.fragment_indices(id).iter().copied())
        .filter_map(|index| {
            let el = &scene.elements[index];
            (!el.is_panel).then(|| FragmentSnapshot {
                index,
                id: el.id,
                transform: el.transform,
                local_center: el.local_center(),
            })
        })
        .collect()
}

/// Put every snapshotted transform back.
pub fn restore(scene: &mut Scene, snapshot: &[FragmentSnapshot]) {
    for snap in snapshot {
        if let Some(el) = scene.elements.get_mut(snap.index) {
            el.transform = snap.transform;
        }
    }
}

// ─── Move ────────────────────────────────────────────────────────────────

/// Translate every fragment of every selected id by `(dx, dy)`.
/// Returns the number of fragments moved.
pub fn translate_selection(scene: &mut Scene, ids: &[ElementId], dx: f64, dy: f64) -> usize {
    let indices: Vec<usize> = ids
        .iter()
        .flat_map(|&id| scene.fragment_indices(id).iter().copied())
        .collect();

    let mut moved = 0;
    for index in indices {
        let el = &mut scene.elements[index];
        if el.is_panel {
            continue;
        }
        el.transform = translated(el.transform, dx, dy);
        moved += 1;
    }
    moved
}

// ─── Resize ──────────────────────────────────────────────────────────────

/// Shift the dragged corner's two edges of `anchor` by `delta`; the
/// opposite edges stay put. The result may have negative extents.
pub fn resize_box(anchor: &BBox, corner: Corner, delta: Vec2) -> BBox {
    let (x, width) = if corner.is_west() {
        (anchor.x + delta.x, anchor.width - delta.x)
    } else {
        (anchor.x, anchor.width + delta.x)
    };
    let (y, height) = if corner.is_north() {
        (anchor.y + delta.y, anchor.height - delta.y)
    } else {
        (anchor.y, anchor.height + delta.y)
    };
    BBox::new(x, y, width, height)
}

/// Ratio of a resized extent to its original; 1 when the original is 0.
pub fn axis_scale(resized: f64, original: f64) -> f64 {
    if original == 0.0 { 1.0 } else { resized / original }
}

/// The edges that stay fixed while `corner` is dragged.
pub fn fixed_edges(anchor: &BBox, corner: Corner) -> Point {
    Point::new(
        if corner.is_west() { anchor.right() } else { anchor.x },
        if corner.is_north() { anchor.bottom() } else { anchor.y },
    )
}

/// Re-derive a fragment's matrix for a resize from `anchor` to `resized`.
///
/// `a` and `d` become the axis scales, keeping the sign they had at drag
/// start so mirrored fragments stay mirrored; `b` and `c` are untouched.
/// The fragment's centre keeps its relative position to the fixed edges.
pub fn resized_transform(
    original: Affine,
    local_center: Point,
    anchor: &BBox,
    resized: &BBox,
    corner: Corner,
) -> Affine {
    let [a0, b, c, d0, _, _] = original.as_coeffs();
    let scale_w = axis_scale(resized.width, anchor.width);
    let scale_h = axis_scale(resized.height, anchor.height);

    let a = if a0 < 0.0 { -scale_w } else { scale_w };
    let d = if d0 < 0.0 { -scale_h } else { scale_h };

    let fixed = fixed_edges(anchor, corner);
    let centre = original * local_center;
    let target = Point::new(
        fixed.x + (centre.x - fixed.x) * scale_w,
        fixed.y + (centre.y - fixed.y) * scale_h,
    );

    let e = target.x - (a * local_center.x + c * local_center.y);
    let f = target.y - (b * local_center.x + d * local_center.y);
    Affine::new([a, b, c, d, e, f])
}

/// An in-progress corner drag.
#[derive(Debug, Clone)]
pub struct ResizeSession {
    pub corner: Corner,
    /// Selection box when the drag started.
    pub anchor: BBox,
    /// Transforms of the selected fragments when the drag started.
    pub snapshot: Vec<FragmentSnapshot>,
    /// Scene displacement of the dragged corner so far.
    pub total: Vec2,
}

impl ResizeSession {
    pub fn begin(scene: &Scene, ids: &[ElementId], anchor: BBox, corner: Corner) -> Self {
        Self {
            corner,
            anchor,
            snapshot: snapshot(scene, ids),
            total: Vec2::ZERO,
        }
    }

    /// Box spanned by the current corner position (may be inverted).
    pub fn current_box(&self) -> BBox {
        resize_box(&self.anchor, self.corner, self.total)
    }

    /// Current `(scale_w, scale_h)`.
    pub fn scale(&self) -> (f64, f64) {
        let b = self.current_box();
        (
            axis_scale(b.width, self.anchor.width),
            axis_scale(b.height, self.anchor.height),
        )
    }

    /// Move the dragged corner by `delta` and rewrite every snapshotted
    /// fragment from its start transform. Returns the new box.
    pub fn drag_by(&mut self, scene: &mut Scene, delta: Vec2) -> BBox {
        self.total += delta;
        let resized = self.current_box();
        for snap in &self.snapshot {
            if let Some(el) = scene.elements.get_mut(snap.index) {
                el.transform = resized_transform(
                    snap.transform,
                    snap.local_center,
                    &self.anchor,
                    &resized,
                    self.corner,
                );
            }
        }
        log::trace!(
            "resize {:?}: box {:?}, scale {:?}",
            self.corner,
            resized,
            self.scale()
        );
        resized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpd_core::model::Element;
    use pretty_assertions::assert_eq;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn unit_scene(transform: Affine) -> Scene {
        let mut scene = Scene::new(200.0, 200.0);
        scene.push(Element::new(ElementId(1), BBox::new(0.0, 0.0, 200.0, 200.0)).panel());
        scene.push(Element::new(ElementId(5), BBox::new(0.0, 0.0, 100.0, 100.0)).with_transform(transform));
        scene
    }

    #[test]
    fn translate_moves_every_fragment_but_the_panel() {
        let mut scene = unit_scene(Affine::IDENTITY);
        scene.push(Element::new(ElementId(5), BBox::new(0.0, 0.0, 5.0, 5.0)));
        let moved = translate_selection(&mut scene, &[ElementId(5), ElementId(1)], 3.0, -2.0);
        assert_eq!(moved, 2);
        assert_eq!(scene.elements[0].transform, Affine::IDENTITY);
        for el in &scene.elements[1..] {
            let [.., e, f] = el.transform.as_coeffs();
            assert_eq!((e, f), (3.0, -2.0));
        }
    }

    #[test]
    fn resize_box_moves_only_dragged_edges() {
        let anchor = BBox::new(0.0, 0.0, 100.0, 100.0);
        let d = Vec2::new(-10.0, -10.0);
        assert_eq!(resize_box(&anchor, Corner::NorthWest, d), BBox::new(-10.0, -10.0, 110.0, 110.0));
        assert_eq!(resize_box(&anchor, Corner::NorthEast, d), BBox::new(0.0, -10.0, 90.0, 110.0));
        assert_eq!(resize_box(&anchor, Corner::SouthWest, d), BBox::new(-10.0, 0.0, 110.0, 90.0));
        assert_eq!(resize_box(&anchor, Corner::SouthEast, d), BBox::new(0.0, 0.0, 90.0, 90.0));
    }

    #[test]
    fn zero_extent_keeps_unit_scale() {
        assert_eq!(axis_scale(12.0, 0.0), 1.0);
        assert_eq!(axis_scale(50.0, 100.0), 0.5);
    }

    #[test]
    fn north_west_drag_scales_mirrored_element() {
        let mirrored = Affine::new([-1.0, 0.0, 0.0, 1.0, 100.0, 0.0]);
        let mut scene = unit_scene(mirrored);
        let anchor = BBox::new(0.0, 0.0, 100.0, 100.0);
        let mut session = ResizeSession::begin(&scene, &[ElementId(5)], anchor, Corner::NorthWest);

        let b = session.drag_by(&mut scene, Vec2::new(-10.0, -10.0));
        assert_eq!(b, BBox::new(-10.0, -10.0, 110.0, 110.0));

        let (sw, sh) = session.scale();
        assert!(close(sw, 1.1) && close(sh, 1.1));

        let [a, _, _, d, e, f] = scene.elements[1].transform.as_coeffs();
        assert!(close(a, -1.1), "a = {a}");
        assert!(close(d, 1.1), "d = {d}");
        assert!(close(e, 100.0), "e = {e}");
        assert!(close(f, -10.0), "f = {f}");
        // The resized element fills the new box exactly.
        let bbox = scene.elements[1].bbox();
        assert!(close(bbox.x, -10.0) && close(bbox.right(), 100.0));
    }

    #[test]
    fn resize_is_rederived_not_accumulated() {
        let mut scene = unit_scene(Affine::IDENTITY);
        let anchor = BBox::new(0.0, 0.0, 100.0, 100.0);
        let mut session = ResizeSession::begin(&scene, &[ElementId(5)], anchor, Corner::SouthEast);
        session.drag_by(&mut scene, Vec2::new(50.0, 0.0));
        session.drag_by(&mut scene, Vec2::new(-50.0, 0.0));
        let [a, _, _, d, e, f] = scene.elements[1].transform.as_coeffs();
        assert!(close(a, 1.0) && close(d, 1.0) && close(e, 0.0) && close(f, 0.0));
    }

    #[test]
    fn skew_coefficients_are_untouched() {
        let original = Affine::new([2.0, 0.25, -0.5, 3.0, 7.0, 9.0]);
        let anchor = BBox::new(0.0, 0.0, 40.0, 40.0);
        let resized = BBox::new(0.0, 0.0, 80.0, 20.0);
        let m = resized_transform(original, Point::new(5.0, 5.0), &anchor, &resized, Corner::SouthEast);
        let [a, b, c, d, _, _] = m.as_coeffs();
        assert_eq!((a, b, c, d), (2.0, 0.25, -0.5, 0.5));
    }

    #[test]
    fn restore_rolls_back_snapshot() {
        let mut scene = unit_scene(Affine::translate((4.0, 4.0)));
        let snap = snapshot(&scene, &[ElementId(5)]);
        translate_selection(&mut scene, &[ElementId(5)], 10.0, 10.0);
        restore(&mut scene, &snap);
        assert_eq!(scene.elements[1].transform, Affine::translate((4.0, 4.0)));
    }
}
