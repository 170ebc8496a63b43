// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Record tables and table transforms.
//!
//! This crate provides:
//! - [`Record`] / [`ReasonTable`]: an ordered table of `(reason, count)` rows, and
//! - a small transform IR ([`Transform`]) with a full-recompute executor ([`Pipeline`]).
//!
//! Transforms never invent or reorder identity: every output row is an input row, so the
//! `reason` key remains usable as stable mark identity downstream.

mod table;
mod transform;

pub use table::{ReasonTable, Record};
pub use transform::{Pipeline, SortOrder, Transform, concat, top_n};
