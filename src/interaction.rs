use std::fmt;

use serde::Serialize;

use crate::config::GridConfig;
use crate::ir::ChildSpec;
use crate::layout::{
    GridPoint, GridSize, LayoutItem, Placeholder, ResizeHandle, bottom, compact,
    compact_in_place, correct_bounds, layout_changed, move_element_in_place, resize_element,
    resolve_drop_position, synchronize_layout_with_children,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Drag,
    Resize,
    Drop,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Drag => "drag",
            Self::Resize => "resize",
            Self::Drop => "drop",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteractionError {
    #[error("a {active} of `{id}` is already in progress")]
    AlreadyActive { active: InteractionKind, id: String },
}

/// What the host renders after each interaction step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutFrame {
    pub layout: Vec<LayoutItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<Placeholder>,
    /// Set on the final frame of an interaction when the geometry differs from
    /// the layout the interaction started with.
    pub changed: bool,
}

#[derive(Debug, Clone)]
struct Active {
    kind: InteractionKind,
    id: String,
    start_layout: Vec<LayoutItem>,
}

/// Owns one layout and serializes drag, resize and drop interactions on it.
#[derive(Debug, Clone)]
pub struct GridSession {
    config: GridConfig,
    layout: Vec<LayoutItem>,
    active: Option<Active>,
}

impl GridSession {
    /// Bounds-correct and settle `layout` under `config`.
    pub fn new(config: GridConfig, layout: Vec<LayoutItem>) -> Self {
        let mut session = Self {
            config,
            layout,
            active: None,
        };
        correct_bounds(&mut session.layout, session.config.cols);
        session.settle();
        session
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn layout(&self) -> &[LayoutItem] {
        &self.layout
    }

    pub fn into_layout(self) -> Vec<LayoutItem> {
        self.layout
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Rebuild from the host's child list. Returns whether the geometry changed.
    pub fn sync_children(&mut self, children: &[ChildSpec]) -> bool {
        let next = synchronize_layout_with_children(
            &self.layout,
            children,
            self.config.cols,
            self.config.effective_compact_type(),
            self.config.allow_overlap,
            None,
        );
        let changed = layout_changed(&self.layout, &next);
        self.layout = next;
        changed
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.layout.iter().position(|item| item.id == id)
    }

    fn ensure_idle(&self) -> Result<(), InteractionError> {
        match &self.active {
            Some(active) => Err(InteractionError::AlreadyActive {
                active: active.kind,
                id: active.id.clone(),
            }),
            None => Ok(()),
        }
    }

    fn begin(&mut self, kind: InteractionKind, id: &str) -> Result<(), InteractionError> {
        self.ensure_idle()?;
        tracing::debug!(message = "session.begin", kind = %kind, id);
        self.active = Some(Active {
            kind,
            id: id.to_string(),
            start_layout: self.layout.clone(),
        });
        Ok(())
    }

    fn finish(&mut self, kind: InteractionKind) -> Option<Active> {
        match &self.active {
            Some(active) if active.kind == kind => self.active.take(),
            _ => None,
        }
    }

    /// Step calls only apply to the item whose interaction of `kind` is running.
    fn active_for(&self, kind: InteractionKind, id: &str) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.kind == kind && active.id == id)
    }

    fn settle(&mut self) {
        if self.config.allow_overlap {
            return;
        }
        let compact_type = self.config.effective_compact_type();
        if self.layout.len() >= self.config.coalesce_threshold {
            compact_in_place(&mut self.layout, compact_type, self.config.cols, false);
        } else {
            self.layout = compact(&self.layout, compact_type, self.config.cols, false);
        }
    }

    fn frame(&self, id: &str, placeholder_static: bool) -> LayoutFrame {
        let placeholder = self
            .index_of(id)
            .map(|index| Placeholder::of(&self.layout[index], placeholder_static));
        LayoutFrame {
            layout: self.layout.clone(),
            placeholder,
            changed: false,
        }
    }

    fn final_frame(&self, start_layout: &[LayoutItem]) -> LayoutFrame {
        LayoutFrame {
            layout: self.layout.clone(),
            placeholder: None,
            changed: layout_changed(start_layout, &self.layout),
        }
    }

    fn move_to(&mut self, index: usize, x: i32, y: i32) {
        let options = self.config.move_options();
        move_element_in_place(&mut self.layout, index, Some(x), Some(y), &options);
        self.settle();
    }

    /// Start dragging `id`. Unknown or non-draggable items yield `Ok(None)`.
    pub fn drag_start(&mut self, id: &str) -> Result<Option<LayoutFrame>, InteractionError> {
        let Some(index) = self.index_of(id) else {
            return Ok(None);
        };
        if !self.config.is_draggable(&self.layout[index]) {
            return Ok(None);
        }
        self.begin(InteractionKind::Drag, id)?;
        Ok(Some(self.frame(id, false)))
    }

    /// One pointer step of a drag to grid cell `(x, y)`.
    pub fn drag(&mut self, id: &str, x: i32, y: i32) -> Option<LayoutFrame> {
        if !self.active_for(InteractionKind::Drag, id) {
            return None;
        }
        let index = self.index_of(id)?;
        self.move_to(index, x, y);
        Some(self.frame(id, false))
    }

    pub fn drag_stop(&mut self, id: &str, x: i32, y: i32) -> Option<LayoutFrame> {
        if !self.active_for(InteractionKind::Drag, id) {
            return None;
        }
        let index = self.index_of(id)?;
        let active = self.finish(InteractionKind::Drag)?;
        self.move_to(index, x, y);
        Some(self.final_frame(&active.start_layout))
    }

    /// Start resizing `id`. Unknown or non-resizable items yield `Ok(None)`.
    pub fn resize_start(&mut self, id: &str) -> Result<Option<LayoutFrame>, InteractionError> {
        let Some(index) = self.index_of(id) else {
            return Ok(None);
        };
        if !self.config.is_resizable(&self.layout[index]) {
            return Ok(None);
        }
        self.begin(InteractionKind::Resize, id)?;
        Ok(Some(self.frame(id, true)))
    }

    /// One pointer step of a resize. Handles the item does not offer are ignored.
    pub fn resize(
        &mut self,
        id: &str,
        w: i32,
        h: i32,
        handle: ResizeHandle,
    ) -> Option<LayoutFrame> {
        if !self.active_for(InteractionKind::Resize, id) {
            return None;
        }
        let index = self.index_of(id)?;
        if !self.config.resize_handles(&self.layout[index]).contains(&handle) {
            return None;
        }
        let outcome = resize_element(&self.layout, id, w, h, handle, &self.config.move_options())?;
        self.layout = outcome.layout;
        self.settle();
        Some(self.frame(id, true))
    }

    pub fn resize_stop(&mut self, id: &str) -> Option<LayoutFrame> {
        if !self.active_for(InteractionKind::Resize, id) {
            return None;
        }
        let active = self.finish(InteractionKind::Resize)?;
        self.settle();
        Some(self.final_frame(&active.start_layout))
    }

    fn drop_cell(&self, size: GridSize, cursor: GridPoint) -> Option<GridPoint> {
        let cols = self.config.cols;
        if size.w <= 0 || size.h <= 0 || size.w > cols {
            return None;
        }
        if self.config.max_rows.is_some_and(|rows| size.h > rows) {
            return None;
        }
        let cursor = GridPoint::new(
            cursor.x.clamp(0, cols - size.w),
            cursor.y.max(0),
        );
        let others: Vec<LayoutItem> = match &self.active {
            Some(active) if active.kind == InteractionKind::Drop => self
                .layout
                .iter()
                .filter(|item| item.id != active.id)
                .cloned()
                .collect(),
            _ => self.layout.clone(),
        };
        resolve_drop_position(
            &others,
            size,
            cursor,
            self.config.drop_strategy,
            self.config.cols,
            self.config.max_rows,
        )
    }

    /// Something is dragged in from outside: insert a ghost item `id` near `cursor`.
    ///
    /// Returns `Ok(None)` when the box can never fit (too wide, too tall) or
    /// `id` is already on the grid.
    pub fn drop_enter(
        &mut self,
        id: &str,
        w: i32,
        h: i32,
        cursor: GridPoint,
    ) -> Result<Option<LayoutFrame>, InteractionError> {
        self.ensure_idle()?;
        if self.index_of(id).is_some() {
            return Ok(None);
        }
        let size = GridSize::new(w, h);
        let Some(cell) = self.drop_cell(size, cursor) else {
            return Ok(None);
        };
        self.begin(InteractionKind::Drop, id)?;

        let mut ghost = LayoutItem::new(id, cell.x, bottom(&self.layout), w, h);
        ghost.is_draggable = Some(true);
        self.layout.push(ghost);
        let index = self.layout.len() - 1;
        self.move_to(index, cell.x, cell.y);
        Ok(Some(self.frame(id, false)))
    }

    /// The external drag moved to a new cell.
    pub fn drop_over(&mut self, cursor: GridPoint) -> Option<LayoutFrame> {
        let id = match &self.active {
            Some(active) if active.kind == InteractionKind::Drop => active.id.clone(),
            _ => return None,
        };
        let index = self.index_of(&id)?;
        let size = GridSize::new(self.layout[index].w, self.layout[index].h);
        let cell = self.drop_cell(size, cursor)?;
        self.move_to(index, cell.x, cell.y);
        Some(self.frame(&id, false))
    }

    /// The external drag left the grid: remove the ghost.
    pub fn drop_leave(&mut self) -> Option<LayoutFrame> {
        let active = self.finish(InteractionKind::Drop)?;
        self.layout.retain(|item| item.id != active.id);
        self.settle();
        Some(self.final_frame(&active.start_layout))
    }

    /// The external item was dropped: keep the ghost under its real id.
    pub fn drop_commit(&mut self, id: &str) -> Option<LayoutFrame> {
        let active = self.finish(InteractionKind::Drop)?;
        if let Some(index) = self.index_of(&active.id) {
            let item = &mut self.layout[index];
            item.id = id.to_string();
            item.is_draggable = None;
        }
        self.settle();
        tracing::debug!(message = "session.drop", ghost = %active.id, id);
        Some(self.final_frame(&active.start_layout))
    }
}

/// Last-write-wins buffer for high-frequency pointer updates.
///
/// Below the threshold every update is handed straight back; at or above it the
/// newest update is parked until [`FrameCoalescer::take_pending`] is called once
/// per animation frame.
#[derive(Debug, Clone)]
pub struct FrameCoalescer<T> {
    threshold: usize,
    pending: Option<T>,
    superseded: u64,
}

impl<T> FrameCoalescer<T> {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            pending: None,
            superseded: 0,
        }
    }

    /// Returns the update when it should be applied now.
    pub fn submit(&mut self, update: T, layout_len: usize) -> Option<T> {
        if layout_len < self.threshold {
            if self.pending.take().is_some() {
                self.superseded += 1;
            }
            return Some(update);
        }
        if self.pending.replace(update).is_some() {
            self.superseded += 1;
            tracing::trace!(message = "frame.superseded", total = self.superseded);
        }
        None
    }

    pub fn take_pending(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Updates dropped because a newer one replaced them.
    pub fn superseded(&self) -> u64 {
        self.superseded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CompactType;

    fn item(id: &str, x: i32, y: i32, w: i32, h: i32) -> LayoutItem {
        LayoutItem::new(id, x, y, w, h)
    }

    fn pos(layout: &[LayoutItem], id: &str) -> (i32, i32) {
        let item = layout.iter().find(|item| item.id == id).expect("item present");
        (item.x, item.y)
    }

    fn session(layout: Vec<LayoutItem>) -> GridSession {
        GridSession::new(GridConfig::default(), layout)
    }

    #[test]
    fn new_session_settles_layout() {
        let s = session(vec![item("a", 20, 4, 2, 1)]);
        assert_eq!(pos(s.layout(), "a"), (10, 0));
    }

    #[test]
    fn drag_lifecycle_reports_change() {
        let mut s = session(vec![item("a", 0, 0, 2, 2), item("b", 2, 0, 2, 2)]);
        let start = s.drag_start("a").expect("idle").expect("known id");
        assert_eq!(start.placeholder.as_ref().map(|p| p.x), Some(0));
        let frame = s.drag("a", 2, 0).expect("known id");
        assert_eq!(pos(&frame.layout, "a"), (2, 0));
        assert_eq!(pos(&frame.layout, "b"), (2, 2));
        let placeholder = frame.placeholder.expect("placeholder");
        assert_eq!((placeholder.x, placeholder.y, placeholder.is_static), (2, 0, false));

        let done = s.drag_stop("a", 2, 0).expect("active drag");
        assert!(done.changed);
        assert!(done.placeholder.is_none());
        assert!(!s.is_active());
    }

    #[test]
    fn second_interaction_is_rejected() {
        let mut s = session(vec![item("a", 0, 0, 1, 1), item("b", 1, 0, 1, 1)]);
        s.drag_start("a").expect("idle");
        let err = s.resize_start("b").unwrap_err();
        assert_eq!(
            err,
            InteractionError::AlreadyActive {
                active: InteractionKind::Drag,
                id: "a".to_string()
            }
        );
        assert_eq!(err.to_string(), "a drag of `a` is already in progress");
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut s = session(vec![item("a", 0, 0, 1, 1)]);
        assert_eq!(s.drag_start("ghost"), Ok(None));
        assert!(s.drag("ghost", 1, 1).is_none());
        assert!(s.resize("ghost", 2, 2, ResizeHandle::Se).is_none());
        assert!(!s.is_active());
    }

    #[test]
    fn statics_cannot_be_dragged() {
        let mut s = session(vec![item("s", 0, 0, 1, 1).pinned()]);
        assert_eq!(s.drag_start("s"), Ok(None));
        assert!(!s.is_active());
    }

    #[test]
    fn drag_stop_without_start_is_ignored() {
        let mut s = session(vec![item("a", 0, 0, 1, 1)]);
        assert!(s.drag_stop("a", 3, 0).is_none());
        assert_eq!(pos(s.layout(), "a"), (0, 0));
    }

    #[test]
    fn drag_without_start_is_ignored() {
        let mut s = session(vec![item("a", 0, 0, 1, 1)]);
        assert!(s.drag("a", 5, 0).is_none());
        assert_eq!(pos(s.layout(), "a"), (0, 0));
    }

    #[test]
    fn locked_item_cannot_be_dragged_by_steps() {
        let mut locked = item("locked", 0, 0, 1, 1);
        locked.is_draggable = Some(false);
        let mut s = session(vec![locked, item("a", 1, 0, 1, 1)]);
        assert_eq!(s.drag_start("locked"), Ok(None));
        assert!(s.drag("locked", 5, 0).is_none());
        assert_eq!(pos(s.layout(), "locked"), (0, 0));
    }

    #[test]
    fn steps_for_another_item_are_ignored_during_a_drag() {
        let mut s = session(vec![item("a", 0, 0, 1, 1), item("b", 1, 0, 1, 1)]);
        s.drag_start("a").expect("idle").expect("known id");
        assert!(s.drag("b", 7, 0).is_none());
        assert!(s.drag_stop("b", 7, 0).is_none());
        assert!(s.is_active());
        assert_eq!(pos(s.layout(), "b"), (1, 0));
        assert!(s.drag_stop("a", 0, 0).is_some());
        assert!(!s.is_active());
    }

    #[test]
    fn resize_steps_need_a_matching_start() {
        let mut s = session(vec![item("a", 0, 0, 1, 1), item("b", 1, 0, 1, 1)]);
        assert!(s.resize("a", 3, 3, ResizeHandle::Se).is_none());
        assert!(s.resize_stop("a").is_none());
        s.resize_start("a").expect("idle").expect("known id");
        assert!(s.resize("b", 3, 3, ResizeHandle::Se).is_none());
        assert!(s.resize_stop("b").is_none());
        assert!(s.drag("a", 4, 0).is_none());
        assert_eq!(s.layout()[1].w, 1);
        assert!(s.resize_stop("a").is_some());
    }

    #[test]
    fn drop_enter_refuses_an_existing_id() {
        let mut s = session(vec![item("a", 0, 0, 2, 2)]);
        assert_eq!(s.drop_enter("a", 1, 1, GridPoint::new(4, 0)), Ok(None));
        assert!(!s.is_active());
        assert_eq!(s.layout().len(), 1);
    }

    #[test]
    fn resize_respects_handles_and_pushes_neighbours() {
        let mut s = session(vec![item("a", 0, 0, 2, 1), item("b", 0, 1, 2, 1)]);
        s.resize_start("a").expect("idle");
        assert!(s.resize("a", 2, 3, ResizeHandle::N).is_none());
        let frame = s.resize("a", 2, 3, ResizeHandle::Se).expect("se allowed");
        assert_eq!(pos(&frame.layout, "b"), (0, 3));
        let placeholder = frame.placeholder.expect("placeholder");
        assert!(placeholder.is_static);
        assert_eq!(placeholder.h, 3);
        let done = s.resize_stop("a").expect("active resize");
        assert!(done.changed);
    }

    #[test]
    fn drop_enter_then_commit_keeps_item() {
        let mut s = session(vec![item("a", 0, 0, 2, 2)]);
        let frame = s
            .drop_enter("__dropping-elem__", 2, 1, GridPoint::new(0, 0))
            .expect("idle")
            .expect("fits");
        assert_eq!(pos(&frame.layout, "__dropping-elem__"), (0, 0));
        assert_eq!(pos(&frame.layout, "a"), (0, 1));

        let frame = s.drop_over(GridPoint::new(4, 0)).expect("drop active");
        assert_eq!(pos(&frame.layout, "__dropping-elem__"), (4, 0));
        assert_eq!(pos(&frame.layout, "a"), (0, 0));

        let done = s.drop_commit("new").expect("drop active");
        assert!(done.changed);
        assert_eq!(pos(s.layout(), "new"), (4, 0));
        assert!(s.layout().iter().all(|item| item.id != "__dropping-elem__"));
    }

    #[test]
    fn drop_leave_restores_layout() {
        let mut s = session(vec![item("a", 0, 0, 2, 2)]);
        s.drop_enter("ghost", 2, 1, GridPoint::new(0, 0)).expect("idle");
        let done = s.drop_leave().expect("drop active");
        assert!(!done.changed);
        assert_eq!(s.layout(), [item("a", 0, 0, 2, 2)]);
    }

    #[test]
    fn drop_too_wide_is_refused() {
        let mut s = session(vec![]);
        assert_eq!(s.drop_enter("ghost", 20, 1, GridPoint::new(0, 0)), Ok(None));
        assert!(!s.is_active());
    }

    #[test]
    fn large_layouts_compact_in_place() {
        let config = GridConfig {
            coalesce_threshold: 2,
            ..GridConfig::default()
        };
        let mut s = GridSession::new(
            config,
            vec![item("a", 0, 5, 1, 1), item("b", 1, 9, 1, 1), item("c", 2, 2, 1, 1)],
        );
        assert!(s.layout().iter().all(|item| item.y == 0));
        s.drag_start("a").expect("idle");
        let frame = s.drag("a", 1, 0).expect("known");
        assert_eq!(pos(&frame.layout, "a"), (1, 0));
        assert_eq!(pos(&frame.layout, "b"), (1, 1));
    }

    #[test]
    fn sync_children_reports_changes() {
        let mut s = session(vec![item("a", 0, 0, 1, 1)]);
        assert!(!s.sync_children(&[ChildSpec::keyed("a")]));
        assert!(s.sync_children(&[ChildSpec::keyed("a"), ChildSpec::keyed("b")]));
        assert_eq!(pos(s.layout(), "b"), (0, 1));
    }

    #[test]
    fn overlap_mode_never_compacts() {
        let config = GridConfig {
            allow_overlap: true,
            compact_type: CompactType::Vertical,
            ..GridConfig::default()
        };
        let mut s = GridSession::new(config, vec![item("a", 0, 3, 1, 1), item("b", 0, 0, 1, 1)]);
        assert_eq!(pos(s.layout(), "a"), (0, 3));
        s.drag_start("b").expect("idle");
        let frame = s.drag("b", 0, 3).expect("known");
        assert_eq!(pos(&frame.layout, "a"), (0, 3));
        assert_eq!(pos(&frame.layout, "b"), (0, 3));
    }

    #[test]
    fn coalescer_applies_small_layouts_immediately() {
        let mut frames = FrameCoalescer::new(200);
        assert_eq!(frames.submit((1, 0), 10), Some((1, 0)));
        assert!(!frames.has_pending());
    }

    #[test]
    fn coalescer_keeps_only_the_latest_update() {
        let mut frames = FrameCoalescer::new(200);
        assert_eq!(frames.submit((1, 0), 500), None);
        assert_eq!(frames.submit((2, 0), 500), None);
        assert_eq!(frames.submit((3, 0), 500), None);
        assert_eq!(frames.superseded(), 2);
        assert_eq!(frames.take_pending(), Some((3, 0)));
        assert_eq!(frames.take_pending(), None);
    }
}
