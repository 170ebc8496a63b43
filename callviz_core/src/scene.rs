// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The retained scene and its keyed join.

use hashbrown::HashMap;
use kurbo::Rect;
use log::{debug, warn};

use crate::mark::{Mark, MarkId, MarkKind, MarkPayload};

/// A change between two consecutive frames of a [`Scene`].
#[derive(Clone, Debug, PartialEq)]
pub enum MarkDiff {
    /// A mark id that was not present in the previous frame.
    Enter {
        /// Mark id.
        id: MarkId,
        /// Mark kind.
        kind: MarkKind,
        /// Render order.
        z_index: i32,
        /// Geometric bounds (if known).
        bounds: Option<Rect>,
        /// Target payload.
        new: Box<MarkPayload>,
    },
    /// A mark id present in both frames whose payload or order changed.
    Update {
        /// Mark id.
        id: MarkId,
        /// Mark kind.
        kind: MarkKind,
        /// Previous render order.
        old_z_index: i32,
        /// New render order.
        new_z_index: i32,
        /// Previous bounds (if known).
        old_bounds: Option<Rect>,
        /// New bounds (if known).
        new_bounds: Option<Rect>,
        /// Previous payload.
        old: Box<MarkPayload>,
        /// Target payload.
        new: Box<MarkPayload>,
    },
    /// A mark id that is no longer present.
    Exit {
        /// Mark id.
        id: MarkId,
        /// Mark kind.
        kind: MarkKind,
        /// Last known bounds (if known).
        bounds: Option<Rect>,
        /// Last payload.
        old: Box<MarkPayload>,
    },
}

impl MarkDiff {
    /// Returns the id this diff refers to.
    pub fn id(&self) -> MarkId {
        match self {
            Self::Enter { id, .. } | Self::Update { id, .. } | Self::Exit { id, .. } => *id,
        }
    }
}

/// The retained set of marks from the last frame.
#[derive(Debug, Default)]
pub struct Scene {
    marks: HashMap<MarkId, Mark>,
    order: Vec<MarkId>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current frame with `marks` and reports the keyed differences.
    ///
    /// Diffs are ordered: exits first (in previous-frame order), then enters and updates in
    /// the order the marks were supplied. Marks whose payload and z-index are unchanged produce
    /// no diff. If the frame contains the same id twice, the last mark wins.
    pub fn tick(&mut self, marks: impl IntoIterator<Item = Mark>) -> Vec<MarkDiff> {
        let mut next: HashMap<MarkId, Mark> = HashMap::new();
        let mut order = Vec::new();
        for mark in marks {
            let id = mark.id;
            if next.insert(id, mark).is_some() {
                warn!("duplicate mark id {id:?} in frame; keeping the last one");
            } else {
                order.push(id);
            }
        }

        let mut diffs = Vec::new();
        for id in &self.order {
            let Some(old) = self.marks.get(id) else {
                continue;
            };
            let replaced_kind = next.get(id).is_some_and(|m| m.kind != old.kind);
            if !next.contains_key(id) || replaced_kind {
                diffs.push(exit_of(old));
            }
        }

        for id in &order {
            let Some(new) = next.get(id) else {
                continue;
            };
            match self.marks.get(id) {
                Some(old) if old.kind == new.kind => {
                    if old.payload != new.payload || old.z_index != new.z_index {
                        diffs.push(MarkDiff::Update {
                            id: *id,
                            kind: new.kind,
                            old_z_index: old.z_index,
                            new_z_index: new.z_index,
                            old_bounds: old.payload.bounds(),
                            new_bounds: new.payload.bounds(),
                            old: Box::new(old.payload.clone()),
                            new: Box::new(new.payload.clone()),
                        });
                    }
                }
                _ => diffs.push(MarkDiff::Enter {
                    id: *id,
                    kind: new.kind,
                    z_index: new.z_index,
                    bounds: new.payload.bounds(),
                    new: Box::new(new.payload.clone()),
                }),
            }
        }

        debug!("scene tick: {} marks, {} diffs", order.len(), diffs.len());
        self.marks = next;
        self.order = order;
        diffs
    }

    /// Returns the mark with the given id, if it is in the current frame.
    pub fn get(&self, id: MarkId) -> Option<&Mark> {
        self.marks.get(&id)
    }

    /// Returns `true` if the current frame contains `id`.
    pub fn contains(&self, id: MarkId) -> bool {
        self.marks.contains_key(&id)
    }

    /// Number of marks in the current frame.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the current frame is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates the current frame in the order it was supplied.
    pub fn marks(&self) -> impl Iterator<Item = &Mark> + '_ {
        self.order.iter().filter_map(|id| self.marks.get(id))
    }
}

fn exit_of(old: &Mark) -> MarkDiff {
    MarkDiff::Exit {
        id: old.id,
        kind: old.kind,
        bounds: old.payload.bounds(),
        old: Box::new(old.payload.clone()),
    }
}
