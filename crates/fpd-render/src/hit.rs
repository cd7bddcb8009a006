//! Hit testing: point → element lookup, rectangle → element sweep.
//!
//! Reverse-walks the paint order (front-to-back) so the first hit is the
//! topmost fragment. Fragments sharing a logical id collapse into one hit.

use fpd_core::id::ElementId;
use fpd_core::model::*;
use kurbo::{ParamCurveNearest, Point, Shape};

/// Accuracy passed to kurbo's nearest-point solver, in local units.
const NEAREST_ACCURACY: f64 = 1e-6;

/// How a rectangle sweep decides membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// Any overlap with the rectangle counts.
    Touch,
    /// The fragment must lie strictly inside the rectangle.
    Enclose,
}

/// Every selectable element under `point` (scene coordinates), topmost
/// first. Empty when the pointer is over the background.
pub fn hit_test_point(scene: &Scene, point: Point) -> Vec<ElementId> {
    let mut hits: Vec<ElementId> = Vec::new();

    // Walk fragments in reverse (last painted = topmost)
    for el in scene.elements.iter().rev() {
        if el.is_panel || hits.contains(&el.id) {
            continue;
        }
        if fragment_contains(el, point) {
            hits.push(el.id);
        }
    }

    log::trace!("hit_test_point({:.2}, {:.2}) -> {:?}", point.x, point.y, hits);
    hits
}

fn fragment_contains(el: &Element, point: Point) -> bool {
    if let PrimitiveKind::Path {
        outline: Some(path),
    } = &el.kind
        && el.transform.determinant().abs() > f64::EPSILON
    {
        let local = el.transform.inverse() * point;
        if path.winding(local) != 0 {
            return true;
        }
        let half_stroke = el.stroke_width / 2.0;
        return half_stroke > 0.0
            && path.segments().any(|seg| {
                seg.nearest(local, NEAREST_ACCURACY).distance_sq <= half_stroke * half_stroke
            });
    }
    el.bbox().contains_point(point)
}

/// Ids of every logical element whose box satisfies `mode` against
/// `rect`, in paint order of first appearance. Used for rubber-band
/// selection.
///
/// Fragments sharing an id are judged together through the union of their
/// plain transformed boxes; stroke is not added.
pub fn hit_test_rect(scene: &Scene, rect: &BBox, mode: Containment) -> Vec<ElementId> {
    let rect = rect.normalized();
    let mut seen = Vec::new();
    let mut result = Vec::new();

    for el in &scene.elements {
        if el.is_panel || seen.contains(&el.id) {
            continue;
        }
        seen.push(el.id);
        let Some(b) = logical_bbox(scene, el.id) else {
            continue;
        };
        let inside = match mode {
            Containment::Touch => b.intersects(&rect),
            Containment::Enclose => b.enclosed_by(&rect),
        };
        if inside {
            result.push(el.id);
        }
    }
    log::trace!("hit_test_rect({rect:?}, {mode:?}) -> {result:?}");
    result
}

/// Union of the plain boxes of every non-panel fragment of `id`.
fn logical_bbox(scene: &Scene, id: ElementId) -> Option<BBox> {
    scene
        .fragments(id)
        .filter(|el| !el.is_panel)
        .map(Element::bbox)
        .reduce(|acc, b| acc.union(&b))
}
