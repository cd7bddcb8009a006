//! Scene document loading: JSON → `Scene`.
//!
//! The host hands over the whole panel on every (re)load. Groups without
//! an id are decoration leftovers of the exporter and are dropped, the
//! same way the editor never offers them for selection.

use crate::id::ElementId;
use crate::model::{BBox, Element, PrimitiveKind, Scene};
use kurbo::{Affine, BezPath, Shape};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Document format ─────────────────────────────────────────────────────

/// Top-level panel document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    /// View-box width.
    pub width: f64,
    /// View-box height (the y-flip pivots on it).
    pub height: f64,
    #[serde(default)]
    pub groups: Vec<GroupDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDoc {
    #[serde(default)]
    pub id: Option<ElementId>,
    /// Marks the panel/background group.
    #[serde(default)]
    pub panel: bool,
    #[serde(default)]
    pub stroke_width: Option<f64>,
    #[serde(default)]
    pub children: Vec<PrimitiveDoc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveTag {
    Path,
    Image,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveDoc {
    pub kind: PrimitiveTag,
    /// SVG path data (paths only).
    #[serde(default)]
    pub d: Option<String>,
    /// Local box; derived from `d` when absent.
    #[serde(default)]
    pub bbox: Option<BBox>,
    /// Matrix coefficients `[a, b, c, d, e, f]`; identity when absent.
    #[serde(default)]
    pub transform: Option<[f64; 6]>,
    /// Overrides the group's stroke width.
    #[serde(default)]
    pub stroke_width: Option<f64>,
}

// ─── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("malformed scene document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid path data in element {id}: {message}")]
    PathData { id: ElementId, message: String },

    #[error("element {id} has neither a bbox nor path data")]
    MissingBBox { id: ElementId },
}

// ─── Loading ─────────────────────────────────────────────────────────────

/// Parse a JSON panel document.
///
/// # Errors
/// `LoadError::Json` when the text is not a valid document.
pub fn parse_document(json: &str) -> Result<SceneDocument, LoadError> {
    Ok(serde_json::from_str(json)?)
}

/// Flatten a document into paint-ordered fragments.
///
/// # Errors
/// `LoadError::PathData` for unparsable path data and
/// `LoadError::MissingBBox` for primitives whose extent is unknown.
pub fn load_scene(doc: &SceneDocument) -> Result<Scene, LoadError> {
    let mut scene = Scene::new(doc.width, doc.height);
    let mut skipped = 0usize;

    for group in &doc.groups {
        let Some(id) = group.id else {
            skipped += 1;
            continue;
        };
        for child in &group.children {
            let element = load_primitive(id, group, child)?;
            scene.push(element);
        }
    }

    log::debug!(
        "loaded panel {}x{}: {} fragments, {} anonymous groups dropped",
        doc.width,
        doc.height,
        scene.len(),
        skipped
    );
    Ok(scene)
}

/// `parse_document` followed by `load_scene`.
///
/// # Errors
/// Any `LoadError` from either step.
pub fn load_scene_json(json: &str) -> Result<Scene, LoadError> {
    load_scene(&parse_document(json)?)
}

fn load_primitive(id: ElementId, group: &GroupDoc, doc: &PrimitiveDoc) -> Result<Element, LoadError> {
    let outline = match (&doc.kind, &doc.d) {
        (PrimitiveTag::Path, Some(d)) => Some(BezPath::from_svg(d).map_err(|e| {
            LoadError::PathData {
                id,
                message: e.to_string(),
            }
        })?),
        _ => None,
    };

    let local_bbox = match (doc.bbox, &outline) {
        (Some(b), _) => b,
        (None, Some(path)) => BBox::from_rect(path.bounding_box()),
        (None, None) => return Err(LoadError::MissingBBox { id }),
    };

    let kind = match doc.kind {
        PrimitiveTag::Path => PrimitiveKind::Path { outline },
        PrimitiveTag::Image => PrimitiveKind::Image,
    };

    Ok(Element {
        id,
        is_panel: group.panel,
        stroke_width: doc.stroke_width.or(group.stroke_width).unwrap_or(0.0),
        kind,
        transform: doc.transform.map(Affine::new).unwrap_or(Affine::IDENTITY),
        local_bbox,
    })
}
