// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed mark scene for `callviz`.
//!
//! Charts describe each frame as a flat list of [`Mark`]s, each carrying a stable [`MarkId`].
//! The [`Scene`] joins that list against the previous frame **by id** (not by position) and
//! reports what happened as [`MarkDiff`]s:
//! - `Enter` for ids that are new in this frame,
//! - `Update` for ids that persist but whose resolved payload changed,
//! - `Exit` for ids that disappeared.
//!
//! A [`Transitioner`] turns those diffs into timed tweens so renderers can animate persisting
//! marks between their old and new geometry.
//!
//! Data-driven marks should derive their ids from the data key (see [`MarkId::for_key`]) so
//! identity survives reordering, filtering, and appends.

mod mark;
mod scene;
mod transition;

pub use mark::{
    Mark, MarkBuilder, MarkId, MarkKind, MarkPayload, PathPayload, RectPayload, TextAnchor,
    TextBaseline, TextPayload,
};
pub use scene::{MarkDiff, Scene};
pub use transition::{Ease, EnterStyle, TransitionSpec, Transitioner, lerp_payload};
