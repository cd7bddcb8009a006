//! Interaction engine: the pointer-driven state machine.
//!
//! Owns the loaded scene, the camera, the selection and its decorations.
//! Every pointer-down is routed by a hit test into one of four drag kinds
//! (pan, move, resize, rubber band) or into the overlap picker. Live
//! updates are applied to the in-memory scene as the pointer moves; the
//! host hears about the result once, on release.
//!
//! ## Readiness gate
//!
//! The host persists every committed change and reloads the scene. Until
//! it has done so the engine refuses new gestures: emitting
//! `SelectionChanged` closes `last_mutation_applied` and emitting
//! `ElementsTransformed` closes `scene_loaded`. `acknowledge_selection()`
//! and `load_scene()` reopen them.

use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::marquee::RubberBand;
use crate::overlap::{HitOutcome, OverlapError, OverlapPick, classify};
use crate::selection::Selection;
use crate::transform::{
    Corner, FragmentSnapshot, ResizeSession, restore, snapshot, translate_selection,
};
use fpd_core::config::EngineConfig;
use fpd_core::coords::{screen_delta_to_scene, screen_to_scene};
use fpd_core::geometry::selection_bbox;
use fpd_core::id::ElementId;
use fpd_core::model::{BBox, Scene};
use fpd_core::view::ViewTransform;
use fpd_render::decor::{self, Decorations};
use fpd_render::hit::hit_test_point;
use kurbo::{Point, Vec2};
use serde::Serialize;
use thiserror::Error;

// ─── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GestureError {
    /// The host has not applied the last commit yet.
    #[error("gesture rejected: scene or last mutation not yet applied")]
    Stale,

    #[error("a gesture or overlap picker is already in progress")]
    Busy,

    #[error("no scene loaded")]
    NoScene,

    #[error(transparent)]
    Overlap(#[from] OverlapError),
}

// ─── Notifications ───────────────────────────────────────────────────────

/// New matrix of one fragment after a committed gesture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformUpdate {
    pub id: ElementId,
    /// Index of the fragment in paint order.
    pub fragment: usize,
    /// `[a, b, c, d, e, f]`.
    pub matrix: [f64; 6],
}

/// What the engine reports back to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Notification {
    /// The selection after a gesture; empty means the panel.
    SelectionChanged(Vec<ElementId>),

    /// Transforms to persist.
    #[serde(rename_all = "camelCase")]
    ElementsTransformed {
        updates: Vec<TransformUpdate>,
        /// Move: total scene delta. Resize: shift of the box origin.
        displacement: [f64; 2],
    },

    /// The pointer landed on several elements; show the picker.
    #[serde(rename_all = "camelCase")]
    AmbiguousHit {
        candidates: Vec<ElementId>,
        screen_x: f64,
        screen_y: f64,
    },
}

// ─── State ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub scene_loaded: bool,
    pub last_mutation_applied: bool,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.scene_loaded && self.last_mutation_applied
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Pan,
    MoveSelection,
    ResizeSelection(Corner),
    RubberBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Dragging(DragKind),
    ResolvingOverlap,
}

/// How a reload treats the camera and the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadMode {
    /// A different document: clear everything, reset the camera.
    Replace,
    /// The same document after a property edit: keep the camera and
    /// restore `selection` (unknown ids are dropped).
    PreserveCamera { selection: Vec<ElementId> },
}

/// Everything needed to finish or roll back one gesture.
#[derive(Debug, Clone)]
struct DragSession {
    kind: DragKind,
    last_screen: Point,
    /// Start-of-gesture transforms of the selected fragments.
    snapshot: Vec<FragmentSnapshot>,
    selection_before: Selection,
    box_before: Option<BBox>,
    cross_before: Option<Point>,
    band: Option<RubberBand>,
    resize: Option<ResizeSession>,
    displacement: Vec2,
    moved: bool,
}

// ─── Engine ──────────────────────────────────────────────────────────────

pub struct InteractionEngine {
    config: EngineConfig,
    scene: Option<Scene>,
    view: ViewTransform,
    selection: Selection,
    selection_box: Option<BBox>,
    cross: Option<Point>,
    readiness: Readiness,
    session: Option<DragSession>,
    pick: Option<OverlapPick>,
}

impl Default for InteractionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl InteractionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            scene: None,
            view: ViewTransform::IDENTITY,
            selection: Selection::new(),
            selection_box: None,
            cross: None,
            readiness: Readiness {
                scene_loaded: false,
                last_mutation_applied: true,
            },
            session: None,
            pick: None,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn selection(&self) -> &[ElementId] {
        self.selection.ids()
    }

    pub fn selection_box(&self) -> Option<BBox> {
        self.selection_box
    }

    /// Scene position of the cross marker, shown for a single selection.
    pub fn cross_marker(&self) -> Option<Point> {
        self.cross
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn overlap_pick(&self) -> Option<&OverlapPick> {
        self.pick.as_ref()
    }

    pub fn state(&self) -> InteractionState {
        if self.pick.is_some() {
            InteractionState::ResolvingOverlap
        } else if let Some(session) = &self.session {
            InteractionState::Dragging(session.kind)
        } else {
            InteractionState::Idle
        }
    }

    // ─── Scene lifecycle ─────────────────────────────────────────────────

    /// Install a freshly loaded scene and reopen `scene_loaded`.
    ///
    /// Any open gesture or picker is dropped without rollback; its
    /// fragments no longer exist. The first load always starts from the
    /// initial camera, whatever the mode.
    pub fn load_scene(&mut self, scene: Scene, mode: ReloadMode) {
        self.session = None;
        self.pick = None;

        let first_load = self.scene.is_none();
        if first_load || mode == ReloadMode::Replace {
            let (width, height) = scene
                .bounds()
                .map_or((scene.width, scene.height), |b| (b.width, b.height));
            self.view = ViewTransform::initial(width, height, &self.config);
        }
        match mode {
            ReloadMode::Replace => {
                self.selection = Selection::new();
            }
            ReloadMode::PreserveCamera { selection } => {
                self.selection = Selection::from_ids(selection);
                self.selection.retain_existing(&scene);
            }
        }
        self.scene = Some(scene);
        self.refresh_decorations();
        self.readiness.scene_loaded = true;

        log::debug!(
            "scene loaded: {} fragments, selection {:?}",
            self.scene.as_ref().map_or(0, Scene::len),
            self.selection.ids()
        );
    }

    /// Update both readiness flags. Closing the gate mid-gesture rolls the
    /// gesture back.
    pub fn set_readiness(&mut self, scene_loaded: bool, last_mutation_applied: bool) {
        self.readiness = Readiness {
            scene_loaded,
            last_mutation_applied,
        };
        if !self.readiness.is_ready() && self.cancel() {
            log::debug!("gate closed mid-gesture; rolled back");
        }
    }

    /// The host has persisted the last selection change.
    pub fn acknowledge_selection(&mut self) {
        self.readiness.last_mutation_applied = true;
    }

    /// Abandon the open gesture or picker, restoring the scene, selection
    /// and decorations captured at its start. Nothing is notified.
    /// Returns whether anything was open.
    pub fn cancel(&mut self) -> bool {
        let had_pick = self.pick.take().is_some();
        let Some(session) = self.session.take() else {
            return had_pick;
        };
        if let Some(scene) = self.scene.as_mut() {
            restore(scene, &session.snapshot);
        }
        self.selection = session.selection_before;
        self.selection_box = session.box_before;
        self.cross = session.cross_before;
        true
    }

    // ─── Event dispatch ──────────────────────────────────────────────────

    /// Feed one input event. Returns the notifications it produced.
    ///
    /// # Errors
    /// `GestureError::Stale` when a pointer-down arrives with the gate
    /// closed, `Busy` when one arrives during a gesture or while the
    /// picker is open, `NoScene` before the first load.
    pub fn handle(&mut self, event: &InputEvent) -> Result<Vec<Notification>, GestureError> {
        match *event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => self.pointer_down(Point::new(x, y), button, modifiers),
            InputEvent::PointerMove { x, y, .. } => {
                self.pointer_move(Point::new(x, y));
                Ok(vec![])
            }
            InputEvent::PointerUp { x, y, .. } => Ok(self.pointer_up(Point::new(x, y))),
            InputEvent::Wheel { x, y, factor } => {
                self.view.zoom_about(factor, Point::new(x, y), &self.config);
                Ok(vec![])
            }
            InputEvent::Zoom { k, x, y } => {
                self.view.set(k, x, y, &self.config);
                Ok(vec![])
            }
        }
    }

    fn pointer_down(
        &mut self,
        screen: Point,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> Result<Vec<Notification>, GestureError> {
        let Some(scene) = self.scene.as_ref() else {
            return Err(GestureError::NoScene);
        };
        if self.session.is_some() || self.pick.is_some() {
            return Err(GestureError::Busy);
        }
        if !self.readiness.is_ready() {
            log::debug!("pointer-down dropped: {:?}", self.readiness);
            return Err(GestureError::Stale);
        }

        let p = screen_to_scene(screen, &self.view, scene.height);
        let shift = modifiers.shift;

        match button {
            PointerButton::Middle => {
                self.begin(DragKind::Pan, screen);
                return Ok(vec![]);
            }
            PointerButton::Secondary => return Ok(vec![]),
            PointerButton::Primary => {}
        }

        if let Some(corner) = self.handle_under(p) {
            self.begin(DragKind::ResizeSelection(corner), screen);
            return Ok(vec![]);
        }

        let inside_box = self.selection_box.is_some_and(|b| b.contains_point(p));
        let has_box = self.selection_box.is_some();

        match classify(hit_test_point(scene, p)) {
            HitOutcome::Single(_) | HitOutcome::Ambiguous(_) if has_box && !shift && inside_box => {
                self.begin(DragKind::MoveSelection, screen);
            }
            HitOutcome::Ambiguous(candidates) => {
                log::debug!("ambiguous hit at {screen:?}: {candidates:?}");
                self.pick = OverlapPick::new(candidates.clone(), screen);
                return Ok(vec![Notification::AmbiguousHit {
                    candidates,
                    screen_x: screen.x,
                    screen_y: screen.y,
                }]);
            }
            HitOutcome::Single(id) => {
                let before = self.capture();
                self.selection.click(id, shift, has_box);
                self.refresh_decorations();
                self.begin_from(DragKind::MoveSelection, screen, before);
            }
            HitOutcome::Background => {
                let before = self.capture();
                if self.selection.click_outside(shift, inside_box) {
                    self.refresh_decorations();
                }
                let kind = if self.selection_box.is_none() || (shift && !inside_box) {
                    DragKind::RubberBand
                } else {
                    DragKind::MoveSelection
                };
                self.begin_from(kind, screen, before);
                if let Some(session) = self.session.as_mut()
                    && kind == DragKind::RubberBand
                {
                    session.band = Some(RubberBand::new(p));
                }
            }
        }
        Ok(vec![])
    }

    fn pointer_move(&mut self, screen: Point) {
        let (Some(scene), Some(session)) = (self.scene.as_mut(), self.session.as_mut()) else {
            return;
        };
        let screen_delta = screen - session.last_screen;
        session.last_screen = screen;
        let delta = screen_delta_to_scene(screen_delta, &self.view);

        match session.kind {
            DragKind::Pan => self.view.pan_by(screen_delta.x, screen_delta.y),
            DragKind::MoveSelection => {
                if self.selection.is_empty() || delta == Vec2::ZERO {
                    return;
                }
                translate_selection(scene, self.selection.ids(), delta.x, delta.y);
                self.selection_box = self.selection_box.map(|b| b.translate(delta.x, delta.y));
                self.cross = self.cross.map(|c| c + delta);
                session.displacement += delta;
                session.moved = true;
            }
            DragKind::ResizeSelection(_) => {
                if delta == Vec2::ZERO {
                    return;
                }
                if let Some(resize) = session.resize.as_mut() {
                    let resized = resize.drag_by(scene, delta);
                    self.selection_box = Some(resized);
                    self.cross = cross_position(scene, &self.selection);
                    session.moved = resized != resize.anchor;
                }
            }
            DragKind::RubberBand => {
                let p = screen_to_scene(screen, &self.view, scene.height);
                if let Some(band) = session.band.as_mut() {
                    band.update(p);
                }
            }
        }
    }

    fn pointer_up(&mut self, screen: Point) -> Vec<Notification> {
        let Some(session) = self.session.take() else {
            return vec![];
        };
        let Some(scene) = self.scene.as_ref() else {
            return vec![];
        };

        match session.kind {
            DragKind::RubberBand => {
                if let Some(mut band) = session.band {
                    band.update(screen_to_scene(screen, &self.view, scene.height));
                    let picked = band.collect(scene);
                    log::debug!("rubber band {:?} picked {:?}", band.rect(), picked);
                    if self.selection.extend(picked) {
                        (self.selection_box, self.cross) = selection_marks(scene, &self.selection);
                    }
                }
            }
            DragKind::ResizeSelection(_) => {
                if let Some(resize) = &session.resize {
                    self.selection_box = Some(resize.current_box().normalized());
                }
            }
            DragKind::Pan | DragKind::MoveSelection => {}
        }

        let mut out = Vec::new();
        if self.selection != session.selection_before {
            out.push(Notification::SelectionChanged(self.selection.ids().to_vec()));
        }
        if session.moved {
            let displacement = match &session.resize {
                Some(resize) => {
                    let b = resize.current_box().normalized();
                    [b.x - resize.anchor.x, b.y - resize.anchor.y]
                }
                None => [session.displacement.x, session.displacement.y],
            };
            let updates = session
                .snapshot
                .iter()
                .map(|snap| TransformUpdate {
                    id: snap.id,
                    fragment: snap.index,
                    matrix: scene.elements[snap.index].transform.as_coeffs(),
                })
                .collect();
            out.push(Notification::ElementsTransformed {
                updates,
                displacement,
            });
        }

        log::debug!("{:?} ended with {} notification(s)", session.kind, out.len());
        self.close_gate_after(&out);
        out
    }

    // ─── Overlap picker ──────────────────────────────────────────────────

    /// Move the picker's red highlight to `id`.
    ///
    /// # Errors
    /// `OverlapError::NotOpen` or `OverlapError::UnknownCandidate`.
    pub fn hover_candidate(&mut self, id: ElementId) -> Result<(), GestureError> {
        let pick = self.pick.as_mut().ok_or(OverlapError::NotOpen)?;
        pick.hover(id)?;
        Ok(())
    }

    /// Pick `id` from the open picker; behaves like a click on it.
    ///
    /// # Errors
    /// `OverlapError::NotOpen` or `OverlapError::UnknownCandidate`; the
    /// picker stays open on an unknown id.
    pub fn choose_candidate(
        &mut self,
        id: ElementId,
        shift: bool,
    ) -> Result<Vec<Notification>, GestureError> {
        let pick = self.pick.as_ref().ok_or(OverlapError::NotOpen)?;
        let id = pick.resolve(id)?;
        self.pick = None;

        let has_box = self.selection_box.is_some();
        let mut out = Vec::new();
        if self.selection.click(id, shift, has_box) {
            self.refresh_decorations();
            out.push(Notification::SelectionChanged(self.selection.ids().to_vec()));
        }
        log::debug!("overlap resolved to {id}");
        self.close_gate_after(&out);
        Ok(out)
    }

    /// Close the picker by clicking outside it: the highlighted candidate
    /// is selected.
    ///
    /// # Errors
    /// `OverlapError::NotOpen` when no picker is open.
    pub fn dismiss_overlap(&mut self, shift: bool) -> Result<Vec<Notification>, GestureError> {
        let highlighted = self.pick.as_ref().ok_or(OverlapError::NotOpen)?.highlighted;
        self.choose_candidate(highlighted, shift)
    }

    // ─── Decorations ─────────────────────────────────────────────────────

    /// Current scale of handles and the cross marker.
    pub fn decoration_scale(&self) -> f64 {
        let width = self.scene.as_ref().map_or(0.0, Scene::panel_width);
        self.view
            .decoration_scale(width, self.config.decoration_scale_cap)
    }

    /// Everything the host should draw on the decoration layer.
    pub fn decorations(&self) -> Decorations {
        let Some(scene) = self.scene.as_ref() else {
            return Decorations::default();
        };
        let scale = self.decoration_scale();
        let transforming = self.session.as_ref().is_some_and(|s| {
            s.moved && matches!(s.kind, DragKind::MoveSelection | DragKind::ResizeSelection(_))
        });

        let mut deco = Decorations {
            selection_box: self.selection_box,
            cross_marker: self
                .cross
                .map(|p| decor::cross_marker(p, scale).as_coeffs()),
            pick_highlight: self
                .pick
                .as_ref()
                .and_then(|pick| decor::highlight(scene, pick.highlighted)),
            rubber_band: self
                .session
                .as_ref()
                .and_then(|s| s.band.as_ref())
                .map(RubberBand::path),
            ..Decorations::default()
        };
        if !transforming {
            deco.highlights = decor::highlights(scene, self.selection.ids());
            if let Some(b) = self.selection_box {
                deco.handles = decor::handles(&b, scale).to_vec();
            }
        }
        deco
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn handle_under(&self, p: Point) -> Option<Corner> {
        let b = self.selection_box?;
        let tolerance = self.config.handle_slop_px / self.view.k;
        decor::handle_at(&b, self.decoration_scale(), p, tolerance)
    }

    fn capture(&self) -> (Selection, Option<BBox>, Option<Point>) {
        (self.selection.clone(), self.selection_box, self.cross)
    }

    fn begin(&mut self, kind: DragKind, screen: Point) {
        let before = self.capture();
        self.begin_from(kind, screen, before);
    }

    fn begin_from(
        &mut self,
        kind: DragKind,
        screen: Point,
        (selection_before, box_before, cross_before): (Selection, Option<BBox>, Option<Point>),
    ) {
        let Some(scene) = self.scene.as_ref() else {
            return;
        };
        let ids = self.selection.ids();
        let resize = match (kind, self.selection_box) {
            (DragKind::ResizeSelection(corner), Some(anchor)) => {
                Some(ResizeSession::begin(scene, ids, anchor, corner))
            }
            _ => None,
        };
        log::debug!("begin {kind:?} with selection {ids:?}");
        self.session = Some(DragSession {
            kind,
            last_screen: screen,
            snapshot: snapshot(scene, ids),
            selection_before,
            box_before,
            cross_before,
            band: None,
            resize,
            displacement: Vec2::ZERO,
            moved: false,
        });
    }

    /// Redraw the selection box and cross marker from the scene.
    fn refresh_decorations(&mut self) {
        (self.selection_box, self.cross) = match self.scene.as_ref() {
            Some(scene) => selection_marks(scene, &self.selection),
            None => (None, None),
        };
    }

    fn close_gate_after(&mut self, emitted: &[Notification]) {
        if !self.config.gate_on_commit {
            return;
        }
        for n in emitted {
            match n {
                Notification::SelectionChanged(_) => self.readiness.last_mutation_applied = false,
                Notification::ElementsTransformed { .. } => self.readiness.scene_loaded = false,
                Notification::AmbiguousHit { .. } => {}
            }
        }
    }
}

/// Selection box and cross marker position for `selection`.
fn selection_marks(scene: &Scene, selection: &Selection) -> (Option<BBox>, Option<Point>) {
    let bbox = if selection.is_empty() {
        None
    } else {
        selection_bbox(scene, selection.ids()).ok()
    };
    (bbox, cross_position(scene, selection))
}

/// Translation of the single selected element's first fragment.
fn cross_position(scene: &Scene, selection: &Selection) -> Option<Point> {
    if selection.len() != 1 {
        return None;
    }
    let el = scene.fragments(selection.first()?).next()?;
    let [.., e, f] = el.transform.as_coeffs();
    Some(Point::new(e, f))
}
