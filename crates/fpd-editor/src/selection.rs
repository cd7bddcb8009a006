//! Selection state.
//!
//! An ordered set of selected element ids. Insertion order is kept so
//! notifications and highlight boxes come out deterministic. An empty
//! selection means the panel itself is selected.

use fpd_core::id::ElementId;
use fpd_core::model::Scene;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection {
    ids: Vec<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, dropping repeats.
    pub fn from_ids<I: IntoIterator<Item = ElementId>>(ids: I) -> Self {
        let mut selection = Self::new();
        selection.extend(ids);
        selection
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    pub fn first(&self) -> Option<ElementId> {
        self.ids.first().copied()
    }

    /// Apply a click on `id`. `has_box` tells whether a selection box is
    /// currently drawn. Returns whether the selection changed.
    ///
    /// Shift toggles `id` in or out (or starts a fresh selection when no
    /// box is drawn). A plain click replaces the selection unless `id` is
    /// already part of it, so click-and-drag moves the whole group.
    pub fn click(&mut self, id: ElementId, shift: bool, has_box: bool) -> bool {
        let before = self.ids.clone();
        if shift {
            if !has_box {
                self.ids = vec![id];
            } else if let Some(pos) = self.ids.iter().position(|&s| s == id) {
                self.ids.remove(pos);
            } else {
                self.ids.push(id);
            }
        } else if !self.contains(id) {
            self.ids = vec![id];
        }
        self.ids != before
    }

    /// Apply a click on the background. Shift, or a click inside the
    /// current selection box, keeps the selection.
    pub fn click_outside(&mut self, shift: bool, inside_box: bool) -> bool {
        if shift || inside_box {
            return false;
        }
        self.clear()
    }

    /// Select nothing (the panel). Returns whether anything was dropped.
    pub fn clear(&mut self) -> bool {
        let changed = !self.ids.is_empty();
        self.ids.clear();
        changed
    }

    /// Append ids not yet selected. Returns whether any were added.
    pub fn extend<I: IntoIterator<Item = ElementId>>(&mut self, ids: I) -> bool {
        let len = self.ids.len();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
        self.ids.len() != len
    }

    /// Drop ids that no longer name a selectable element.
    pub fn retain_existing(&mut self, scene: &Scene) -> bool {
        let len = self.ids.len();
        self.ids.retain(|&id| scene.is_selectable(id));
        self.ids.len() != len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpd_core::model::{BBox, Element};
    use pretty_assertions::assert_eq;

    fn ids(raw: &[u64]) -> Vec<ElementId> {
        raw.iter().copied().map(ElementId).collect()
    }

    #[test]
    fn plain_click_replaces_selection() {
        let mut sel = Selection::new();
        assert!(sel.click(ElementId(5), false, false));
        assert_eq!(sel.ids(), ids(&[5]));
        assert!(sel.click(ElementId(9), false, true));
        assert_eq!(sel.ids(), ids(&[9]));
    }

    #[test]
    fn plain_click_on_member_keeps_multi_selection() {
        let mut sel = Selection::from_ids(ids(&[5, 9]));
        assert!(!sel.click(ElementId(9), false, true));
        assert_eq!(sel.ids(), ids(&[5, 9]));
    }

    #[test]
    fn shift_click_toggles() {
        let mut sel = Selection::from_ids(ids(&[5]));
        assert!(sel.click(ElementId(9), true, true));
        assert_eq!(sel.ids(), ids(&[5, 9]));
        assert!(sel.click(ElementId(5), true, true));
        assert_eq!(sel.ids(), ids(&[9]));
    }

    #[test]
    fn shift_click_without_box_starts_fresh() {
        let mut sel = Selection::new();
        assert!(sel.click(ElementId(5), true, false));
        assert_eq!(sel.ids(), ids(&[5]));
        // Same id again without a box: no change to report.
        assert!(!sel.click(ElementId(5), true, false));
    }

    #[test]
    fn click_outside_respects_shift_and_box() {
        let mut sel = Selection::from_ids(ids(&[5]));
        assert!(!sel.click_outside(true, false));
        assert!(!sel.click_outside(false, true));
        assert_eq!(sel.len(), 1);
        assert!(sel.click_outside(false, false));
        assert!(sel.is_empty());
        assert!(!sel.click_outside(false, false));
    }

    #[test]
    fn extend_deduplicates() {
        let mut sel = Selection::from_ids(ids(&[1, 2, 1]));
        assert_eq!(sel.ids(), ids(&[1, 2]));
        assert!(sel.extend(ids(&[2, 3, 3])));
        assert_eq!(sel.ids(), ids(&[1, 2, 3]));
        assert!(!sel.extend(ids(&[1])));
    }

    #[test]
    fn retain_existing_drops_stale_and_panel_ids() {
        let mut scene = Scene::new(10.0, 10.0);
        scene.push(Element::new(ElementId(1), BBox::new(0.0, 0.0, 10.0, 10.0)).panel());
        scene.push(Element::new(ElementId(4), BBox::new(0.0, 0.0, 1.0, 1.0)));

        let mut sel = Selection::from_ids(ids(&[4, 1, 8]));
        assert!(sel.retain_existing(&scene));
        assert_eq!(sel.ids(), ids(&[4]));
    }
}
