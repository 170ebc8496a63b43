// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-order conventions for chart-generated marks.
//!
//! `callviz_core` marks carry an explicit `z_index`. Renderers sort by `(z_index, MarkId)` for a
//! deterministic tie-break.

/// Bars.
pub const SERIES_FILL: i32 = 0;
/// Stroked series marks (rules).
pub const SERIES_STROKE: i32 = 10;

/// Axis domain line and tick marks.
pub const AXIS_RULES: i32 = 30;
/// Axis tick labels.
pub const AXIS_LABELS: i32 = 40;
/// Axis title labels.
pub const AXIS_TITLES: i32 = 50;

/// Chart-level titles and annotations (the source citation).
pub const TITLES: i32 = 80;
