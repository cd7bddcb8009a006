//! Disambiguation of overlapping elements under the pointer.
//!
//! When a click lands on more than one logical element, the host shows a
//! picker listing the candidates. Hovering a list entry moves the red
//! highlight; picking one is handled like a click on that element.

use fpd_core::id::ElementId;
use kurbo::Point;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OverlapError {
    #[error("{0} is not one of the overlapping candidates")]
    UnknownCandidate(ElementId),

    #[error("no overlap picker is open")]
    NotOpen,
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitOutcome {
    Background,
    Single(ElementId),
    /// Several distinct ids, topmost first.
    Ambiguous(Vec<ElementId>),
}

/// Classify a topmost-first, deduplicated hit list.
pub fn classify(hits: Vec<ElementId>) -> HitOutcome {
    match hits.as_slice() {
        [] => HitOutcome::Background,
        [id] => HitOutcome::Single(*id),
        _ => HitOutcome::Ambiguous(hits),
    }
}

/// An open picker.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapPick {
    pub candidates: Vec<ElementId>,
    /// Where the picker should appear, in container pixels.
    pub screen: Point,
    pub highlighted: ElementId,
}

impl OverlapPick {
    /// Open a picker highlighting the topmost candidate.
    /// `None` when there is nothing to pick from.
    pub fn new(candidates: Vec<ElementId>, screen: Point) -> Option<Self> {
        let highlighted = *candidates.first()?;
        Some(Self {
            candidates,
            screen,
            highlighted,
        })
    }

    /// Check that `id` is one of the candidates.
    ///
    /// # Errors
    /// `OverlapError::UnknownCandidate` otherwise.
    pub fn resolve(&self, id: ElementId) -> Result<ElementId, OverlapError> {
        if self.candidates.contains(&id) {
            Ok(id)
        } else {
            Err(OverlapError::UnknownCandidate(id))
        }
    }

    /// Move the highlight to `id`.
    ///
    /// # Errors
    /// `OverlapError::UnknownCandidate` when `id` is not offered.
    pub fn hover(&mut self, id: ElementId) -> Result<(), OverlapError> {
        self.highlighted = self.resolve(id)?;
        Ok(())
    }
}
