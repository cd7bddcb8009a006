//! In-memory element model for a front panel scene.
//!
//! A panel document is a flat list of groups, each holding one or more
//! path/image primitives. The loader flattens every primitive into an
//! `Element` that carries its group's id, panel flag and stroke width, so
//! the interaction core never has to walk a tree or re-read attributes.
//! Elements keep paint order: later entries are drawn on top.

use crate::id::ElementId;
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

// ─── Bounding box ────────────────────────────────────────────────────────

/// Axis-aligned box `{x, y, width, height}` in scene units.
///
/// Width and height may go negative while a resize drags a corner past
/// the opposite edge; `normalized()` folds such a box back.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x0, rect.y0, rect.x1 - rect.x0, rect.y1 - rect.y0)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.right(), self.bottom())
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Grow by `amount` on all four sides.
    pub fn expand(&self, amount: f64) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Fold a possibly inverted box into one with non-negative extents.
    pub fn normalized(&self) -> Self {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Self::new(x, y, width, height)
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BBox) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(x, y, right - x, bottom - y)
    }

    /// Strict interior test; a point on an edge is outside.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.right() && p.y > self.y && p.y < self.bottom()
    }

    /// AABB overlap with strict inequalities (touching edges do not count).
    pub fn intersects(&self, other: &BBox) -> bool {
        self.right() > other.x
            && other.bottom() > self.y
            && self.bottom() > other.y
            && other.right() > self.x
    }

    /// `true` when `self` lies strictly inside `outer`.
    pub fn enclosed_by(&self, outer: &BBox) -> bool {
        self.x > outer.x
            && outer.bottom() > self.bottom()
            && self.y > outer.y
            && outer.right() > self.right()
    }
}

// ─── Matrix helpers ──────────────────────────────────────────────────────

/// Add `(dx, dy)` to the translation components `e`, `f` of a matrix.
pub fn translated(m: Affine, dx: f64, dy: f64) -> Affine {
    let [a, b, c, d, e, f] = m.as_coeffs();
    Affine::new([a, b, c, d, e + dx, f + dy])
}

/// Replace the translation components `e`, `f` of a matrix.
pub fn with_translation(m: Affine, e: f64, f: f64) -> Affine {
    let [a, b, c, d, _, _] = m.as_coeffs();
    Affine::new([a, b, c, d, e, f])
}

// ─── Elements ────────────────────────────────────────────────────────────

/// What a fragment is drawn with.
#[derive(Debug, Clone, Default)]
pub enum PrimitiveKind {
    /// A vector path; `outline` is kept for exact hit testing when the
    /// document supplied path data.
    Path { outline: Option<BezPath> },
    /// A raster image; hit testing falls back to its box.
    #[default]
    Image,
}

/// One rendered fragment of a logical element.
#[derive(Debug, Clone)]
pub struct Element {
    /// Logical id (shared by every fragment of the same element).
    pub id: ElementId,

    /// The panel/background group is never selectable.
    pub is_panel: bool,

    /// Stroke width inherited from the owning group (0 when absent).
    pub stroke_width: f64,

    pub kind: PrimitiveKind,

    /// Affine matrix `a b c d e f` placing the primitive in scene space.
    pub transform: Affine,

    /// Box of the primitive in its own coordinates, before the transform.
    pub local_bbox: BBox,
}

impl Element {
    pub fn new(id: ElementId, local_bbox: BBox) -> Self {
        Self {
            id,
            is_panel: false,
            stroke_width: 0.0,
            kind: PrimitiveKind::Image,
            transform: Affine::IDENTITY,
            local_bbox,
        }
    }

    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: f64) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    pub fn panel(mut self) -> Self {
        self.is_panel = true;
        self
    }

    /// Scene-space box: the envelope of the local box under the transform.
    /// Stroke is not included; see `geometry::precise_bbox`.
    pub fn bbox(&self) -> BBox {
        BBox::from_rect(self.transform.transform_rect_bbox(self.local_bbox.to_rect()))
    }

    pub fn local_center(&self) -> Point {
        self.local_bbox.center()
    }

    pub fn scene_center(&self) -> Point {
        self.transform * self.local_center()
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────

/// All fragments of the loaded panel in paint order, plus an id index.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub elements: Vec<Element>,

    /// Index from ElementId → fragment positions in `elements`.
    pub id_index: HashMap<ElementId, SmallVec<[usize; 2]>>,

    /// Document view-box width.
    pub width: f64,

    /// Document view-box height; the view flips y around it.
    pub height: f64,
}

impl Scene {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            elements: Vec::new(),
            id_index: HashMap::new(),
            width,
            height,
        }
    }

    /// Append a fragment on top of the paint order. Returns its index.
    pub fn push(&mut self, element: Element) -> usize {
        let idx = self.elements.len();
        self.id_index.entry(element.id).or_default().push(idx);
        self.elements.push(element);
        idx
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Fragment indices for a logical id (empty when unknown).
    pub fn fragment_indices(&self, id: ElementId) -> &[usize] {
        self.id_index.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// All fragments drawn for a logical id.
    pub fn fragments(&self, id: ElementId) -> impl Iterator<Item = &Element> + '_ {
        self.fragment_indices(id)
            .iter()
            .map(move |&idx| &self.elements[idx])
    }

    /// Whether `id` names a selectable (non-panel) element.
    pub fn is_selectable(&self, id: ElementId) -> bool {
        self.fragments(id).any(|el| !el.is_panel)
    }

    /// Selectable ids in order of first appearance.
    pub fn selectable_ids(&self) -> Vec<ElementId> {
        let mut ids = Vec::new();
        for el in &self.elements {
            if !el.is_panel && !ids.contains(&el.id) {
                ids.push(el.id);
            }
        }
        ids
    }

    /// Id of the panel/background group, if the document has one.
    pub fn panel_id(&self) -> Option<ElementId> {
        self.elements.iter().find(|el| el.is_panel).map(|el| el.id)
    }

    /// Envelope of every fragment, panel included. `None` for an empty scene.
    pub fn bounds(&self) -> Option<BBox> {
        self.elements
            .iter()
            .map(Element::bbox)
            .reduce(|acc, b| acc.union(&b))
    }

    /// Width of the drawn panel, used to size decorations.
    pub fn panel_width(&self) -> f64 {
        self.bounds().map(|b| b.width).unwrap_or(0.0)
    }
}
