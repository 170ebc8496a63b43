// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tiny measure/arrange layout helper for charts.
//!
//! - **Measure**: guides (axes) report the thickness they need along their normal.
//! - **Arrange**: the view is split into a plot rectangle and the margins around it. A measured
//!   guide can widen its margin but never shrinks it below the configured value.

use kurbo::Rect;

/// A width/height pair used by chart layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    /// Width in chart coordinate units.
    pub width: f64,
    /// Height in chart coordinate units.
    pub height: f64,
}

impl Size {
    /// Creates a size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Per-side margins around the plot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margin {
    /// Space above the plot.
    pub top: f64,
    /// Space right of the plot.
    pub right: f64,
    /// Space below the plot (bottom axis, title, citation).
    pub bottom: f64,
    /// Space left of the plot (left axis and wrapped labels).
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 30.0,
            bottom: 50.0,
            left: 200.0,
        }
    }
}

/// Layout inputs for a single chart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartLayoutSpec {
    /// Outer chart bounds.
    pub view_size: Size,
    /// Minimum margins.
    pub margin: Margin,
    /// Measured left axis thickness, if any.
    pub axis_left: Option<f64>,
    /// Measured bottom axis thickness, if any.
    pub axis_bottom: Option<f64>,
}

impl Default for ChartLayoutSpec {
    fn default() -> Self {
        Self {
            view_size: Size::new(1000.0, 600.0),
            margin: Margin::default(),
            axis_left: None,
            axis_bottom: None,
        }
    }
}

/// Output of the arrange pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartLayout {
    /// Outer chart bounds.
    pub view: Rect,
    /// The plot (data) rectangle.
    pub plot: Rect,
    /// Reserved rectangle left of the plot, spanning the whole left margin.
    pub axis_left: Rect,
    /// Reserved rectangle below the plot, spanning the whole bottom margin.
    pub axis_bottom: Rect,
}

impl ChartLayout {
    /// Computes a layout from the provided specification.
    ///
    /// The plot shrinks to zero rather than going negative when margins exceed the view.
    pub fn arrange(spec: &ChartLayoutSpec) -> Self {
        let m = spec.margin;
        let left = m.left.max(spec.axis_left.unwrap_or(0.0)).max(0.0);
        let bottom = m.bottom.max(spec.axis_bottom.unwrap_or(0.0)).max(0.0);
        let top = m.top.max(0.0);
        let right = m.right.max(0.0);

        let view = Rect::new(
            0.0,
            0.0,
            spec.view_size.width.max(0.0),
            spec.view_size.height.max(0.0),
        );
        let plot_w = (view.width() - left - right).max(0.0);
        let plot_h = (view.height() - top - bottom).max(0.0);
        let plot = Rect::new(left, top, left + plot_w, top + plot_h);

        Self {
            view,
            plot,
            axis_left: Rect::new(view.x0, plot.y0, plot.x0, plot.y1),
            axis_bottom: Rect::new(plot.x0, plot.y1, plot.x1, view.y1),
        }
    }
}
