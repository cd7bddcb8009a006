//! Selection decoration geometry.
//!
//! Everything drawn on top of the panel to show the selection: the dashed
//! selection box, per-element highlight boxes for multi-selections, the
//! four resize handles, the cross marker on a single selected element,
//! the overlap pick highlight and the rubber-band rectangle.
//!
//! All geometry is in scene coordinates; the host applies the view
//! matrix once to the whole decoration layer.

use fpd_core::geometry::group_bbox;
use fpd_core::id::ElementId;
use fpd_core::model::{BBox, Scene};
use kurbo::{Affine, Point};
use serde::Serialize;

// ─── Corners ─────────────────────────────────────────────────────────────

/// A resize handle position. Scene y grows downward, so north is the
/// box's `y` edge and south its `y + height` edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthWest,
        Corner::SouthEast,
    ];

    /// Whether dragging this corner moves the west (`x`) edge.
    pub fn is_west(self) -> bool {
        matches!(self, Corner::NorthWest | Corner::SouthWest)
    }

    /// Whether dragging this corner moves the north (`y`) edge.
    pub fn is_north(self) -> bool {
        matches!(self, Corner::NorthWest | Corner::NorthEast)
    }
}

// ─── Handles ─────────────────────────────────────────────────────────────

/// A square resize handle centred just outside a box corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Handle {
    pub corner: Corner,
    pub x: f64,
    pub y: f64,
    /// Half the side of the square.
    pub half_side: f64,
}

impl Handle {
    /// Whether `p` lies on the handle, grown by `tolerance` on every side.
    pub fn contains(&self, p: Point, tolerance: f64) -> bool {
        let reach = self.half_side + tolerance;
        (p.x - self.x).abs() <= reach && (p.y - self.y).abs() <= reach
    }
}

/// Half side of a handle whose symbol area is `size` (the decoration scale).
pub fn handle_half_side(size: f64) -> f64 {
    size.max(0.0).sqrt() / 2.0
}

/// The four handles around `bbox`, each pushed outward by its half side
/// so it sits clear of the box outline.
pub fn handles(bbox: &BBox, size: f64) -> [Handle; 4] {
    let hw = handle_half_side(size);
    let b = bbox.normalized();
    Corner::ALL.map(|corner| {
        let x = if corner.is_west() { b.x - hw } else { b.right() + hw };
        let y = if corner.is_north() { b.y - hw } else { b.bottom() + hw };
        Handle {
            corner,
            x,
            y,
            half_side: hw,
        }
    })
}

/// The handle under `p`, if any. Later corners win on overlap, which only
/// happens for degenerate boxes.
pub fn handle_at(bbox: &BBox, size: f64, p: Point, tolerance: f64) -> Option<Corner> {
    handles(bbox, size)
        .iter()
        .rev()
        .find(|h| h.contains(p, tolerance))
        .map(|h| h.corner)
}

// ─── Cross marker ────────────────────────────────────────────────────────

/// Matrix of the cross marker drawn at `(e, f)` with uniform `scale`.
pub fn cross_marker(position: Point, scale: f64) -> Affine {
    Affine::new([scale, 0.0, 0.0, scale, position.x, position.y])
}

// ─── Rubber band ─────────────────────────────────────────────────────────

/// Closed path through the band's four corners, starting at the origin.
pub fn band_path(origin: Point, current: Point) -> String {
    format!(
        "M {},{}L {},{}L {},{}L {},{}z",
        origin.x, origin.y, current.x, origin.y, current.x, current.y, origin.x, current.y
    )
}

// ─── Decoration layer ────────────────────────────────────────────────────

/// Per-element outline drawn for each member of a multi-selection, or in
/// red for the overlap picker's highlighted candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: ElementId,
    pub bbox: BBox,
}

/// Snapshot of everything the host should draw on the decoration layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decorations {
    pub selection_box: Option<BBox>,
    pub highlights: Vec<Highlight>,
    pub handles: Vec<Handle>,
    /// Cross marker matrix `[a, b, c, d, e, f]`.
    pub cross_marker: Option<[f64; 6]>,
    pub pick_highlight: Option<Highlight>,
    pub rubber_band: Option<String>,
}

impl Decorations {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One highlight per selected id, only when more than one is selected.
pub fn highlights(scene: &Scene, ids: &[ElementId]) -> Vec<Highlight> {
    if ids.len() < 2 {
        return Vec::new();
    }
    ids.iter()
        .filter_map(|&id| highlight(scene, id))
        .collect()
}

/// Highlight box for a single id; `None` when the id has no fragments.
pub fn highlight(scene: &Scene, id: ElementId) -> Option<Highlight> {
    group_bbox(scene.fragments(id))
        .ok()
        .map(|bbox| Highlight { id, bbox })
}
