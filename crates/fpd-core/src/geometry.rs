//! Bounding-box measurement with stroke compensation.
//!
//! A stroked outline paints half its stroke width outside the geometric
//! box. Hairlines (stroke width exactly 1) are drawn with a non-scaling
//! stroke and get no compensation.

use crate::id::ElementId;
use crate::model::{BBox, Element, Scene};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// A union was requested over nothing. Callers guard empty selections.
    #[error("bounding box requested for an empty set of elements")]
    EmptyInput,
}

/// Amount added on every side of a box for the given stroke width.
pub fn stroke_compensation(stroke_width: f64) -> f64 {
    if stroke_width == 1.0 {
        0.0
    } else {
        stroke_width / 2.0
    }
}

/// Scene box of a fragment grown by its stroke compensation.
pub fn precise_bbox(element: &Element) -> BBox {
    element
        .bbox()
        .expand(stroke_compensation(element.stroke_width))
}

/// Union of a list of boxes.
///
/// # Errors
/// `GeometryError::EmptyInput` when `boxes` yields nothing.
pub fn union_bbox<I>(boxes: I) -> Result<BBox, GeometryError>
where
    I: IntoIterator<Item = BBox>,
{
    let mut iter = boxes.into_iter();
    let first = iter.next().ok_or(GeometryError::EmptyInput)?;
    let (mut min_x, mut min_y) = (first.x, first.y);
    let (mut max_x, mut max_y) = (first.right(), first.bottom());
    for b in iter {
        min_x = min_x.min(b.x);
        min_y = min_y.min(b.y);
        max_x = max_x.max(b.right());
        max_y = max_y.max(b.bottom());
    }
    Ok(BBox::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Precise box of one logical element across all of its fragments.
///
/// # Errors
/// `GeometryError::EmptyInput` when no fragment is given.
pub fn group_bbox<'a, I>(fragments: I) -> Result<BBox, GeometryError>
where
    I: IntoIterator<Item = &'a Element>,
{
    union_bbox(fragments.into_iter().map(precise_bbox))
}

/// Precise box around every non-panel fragment whose id is in `ids`.
///
/// # Errors
/// `GeometryError::EmptyInput` when none of `ids` resolves to a fragment.
pub fn selection_bbox(scene: &Scene, ids: &[ElementId]) -> Result<BBox, GeometryError> {
    union_bbox(
        ids.iter()
            .flat_map(|&id| scene.fragments(id))
            .filter(|el| !el.is_panel)
            .map(precise_bbox),
    )
}
