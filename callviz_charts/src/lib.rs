// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bar chart building blocks for `callviz_core`.
//!
//! This crate is a small, reusable layer above `callviz_core`:
//! - **Scales** map data values (counts, category keys) into screen coordinates.
//! - **Guides** (axes, the source citation) are built by generating `callviz_core::Mark`s.
//! - **Series** marks (bars) derive their identity from the category key so a keyed
//!   [`callviz_core::Scene`] can diff them across filter changes.
//!
//! Text shaping is out of scope; text marks store unshaped strings and layout relies on a
//! [`TextMeasurer`] for extents.

mod axis;
mod bar_mark;
mod chart_spec;
mod format;
mod layout;
mod scale;
mod z_order;


pub use axis::{AxisOrient, AxisSpec, AxisStyle, StrokeStyle};
pub use bar_mark::{BarMarkSpec, BarOrient};
pub use callviz_text::{HeuristicTextMeasurer, TextMeasurer, TextStyle};
pub use chart_spec::{BarChartSpec, BarStyle, CATEGORY_TITLE, CITATION, VALUE_TITLE};
pub use format::format_tick_with_step;
pub use layout::{ChartLayout, ChartLayoutSpec, Margin, Size};
pub use scale::{ScaleBand, ScaleBandSpec, ScaleLinear, ScaleLinearSpec, ScaleSpec};
pub use z_order::*;
