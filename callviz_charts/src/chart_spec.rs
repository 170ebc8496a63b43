// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart composition.
//!
//! [`BarChartSpec`] owns the layout inputs, both axes, the bar series and the source citation,
//! and compiles them into one flat list of stable-identity marks per frame.

use callviz_core::{Mark, MarkId, TextAnchor};
use callviz_text::TextMeasurer;
use callviz_transforms::Record;
use peniko::color::palette::css;
use peniko::{Brush, Color};

use crate::{
    AxisOrient, AxisSpec, BarMarkSpec, BarOrient, ChartLayout, ChartLayoutSpec, ScaleBandSpec,
    ScaleLinearSpec, z_order,
};

/// Default title of the count axis.
pub const VALUE_TITLE: &str = "Count";
/// Default title of the category axis.
pub const CATEGORY_TITLE: &str = "Reason for Call";
/// Default source citation.
pub const CITATION: &str = "Source: City of Boston 311 Data (2023)";

const CATEGORY_AXIS_ID: u64 = 100;
const VALUE_AXIS_ID: u64 = 200;
const CITATION_ID: u64 = 1;

/// Paint and type settings for a bar chart.
#[derive(Clone, Debug, PartialEq)]
pub struct BarStyle {
    /// Resting bar fill.
    pub fill: Brush,
    /// Bar fill under the pointer.
    pub hover_fill: Brush,
    /// Band padding (inner and outer).
    pub padding: f64,
    /// Tick label font size.
    pub label_font_size: f64,
    /// Axis title font size.
    pub title_font_size: f64,
    /// Citation font size.
    pub citation_font_size: f64,
    /// Citation fill.
    pub citation_fill: Brush,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            fill: Brush::Solid(css::BLUE),
            hover_fill: Brush::Solid(css::ORANGE),
            padding: 0.2,
            label_font_size: 12.0,
            title_font_size: 14.0,
            citation_font_size: 10.0,
            citation_fill: Brush::Solid(Color::from_rgb8(0x55, 0x55, 0x55)),
        }
    }
}

/// A top-N bar chart: one bar per record, keyed by reason.
#[derive(Clone, Debug)]
pub struct BarChartSpec {
    /// Bar direction.
    pub orient: BarOrient,
    /// Records to draw, in band order.
    pub records: Vec<Record>,
    /// Upper bound of the count domain before niceing.
    ///
    /// `None` uses the largest finite count in `records`.
    pub value_max: Option<f64>,
    /// View size and minimum margins.
    pub layout: ChartLayoutSpec,
    /// Whether measured axes may widen the margins.
    ///
    /// Vertical charts always fit, since their rotated labels need the room.
    pub fit_margins: bool,
    /// Approximate tick count on the count axis.
    pub tick_count: usize,
    /// Maximum width of a category label line.
    pub label_wrap_width: Option<f64>,
    /// Count axis title.
    pub value_title: Option<String>,
    /// Category axis title.
    pub category_title: Option<String>,
    /// Citation line below the plot.
    pub citation: Option<String>,
    /// Paint and type.
    pub style: BarStyle,
    /// Reason under the pointer.
    pub hovered: Option<String>,
    /// Whether bars are displayed.
    pub bars_visible: bool,
}

impl BarChartSpec {
    /// Creates a horizontal chart over `records` with the default titles, margins and style.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            orient: BarOrient::Horizontal,
            records,
            value_max: None,
            layout: ChartLayoutSpec::default(),
            fit_margins: false,
            tick_count: 10,
            label_wrap_width: Some(180.0),
            value_title: Some(VALUE_TITLE.into()),
            category_title: Some(CATEGORY_TITLE.into()),
            citation: Some(CITATION.into()),
            style: BarStyle::default(),
            hovered: None,
            bars_visible: true,
        }
    }

    /// Replaces the records, keeping every other setting.
    pub fn with_records(mut self, records: Vec<Record>) -> Self {
        self.records = records;
        self
    }

    /// Sets the bar direction.
    pub fn with_orient(mut self, orient: BarOrient) -> Self {
        self.orient = orient;
        self
    }

    /// Pins the count domain to `[0, max]` regardless of which records are drawn.
    pub fn with_value_max(mut self, max: Option<f64>) -> Self {
        self.value_max = max;
        self
    }

    /// Sets the layout inputs.
    pub fn with_layout(mut self, layout: ChartLayoutSpec) -> Self {
        self.layout = layout;
        self
    }

    /// Lets measured axes widen the margins.
    pub fn with_fit_margins(mut self, fit: bool) -> Self {
        self.fit_margins = fit;
        self
    }

    /// Sets the category label wrap width.
    pub fn with_label_wrap_width(mut self, width: Option<f64>) -> Self {
        self.label_wrap_width = width;
        self
    }

    /// Sets paint and type.
    pub fn with_style(mut self, style: BarStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the hovered reason.
    pub fn with_hovered(mut self, hovered: Option<String>) -> Self {
        self.hovered = hovered;
        self
    }

    /// Shows or hides the bars.
    pub fn with_bars_visible(mut self, visible: bool) -> Self {
        self.bars_visible = visible;
        self
    }

    /// The count domain before niceing: `[0, max]`, or `[0, 1]` when there is no positive count.
    pub fn value_domain(&self) -> (f64, f64) {
        let max = self.value_max.or_else(|| {
            self.records
                .iter()
                .map(|r| r.count)
                .filter(|c| c.is_finite())
                .reduce(f64::max)
        });
        match max {
            Some(m) if m.is_finite() && m > 0.0 => (0.0, m),
            _ => (0.0, 1.0),
        }
    }

    /// The category axis (left for horizontal bars, bottom for vertical ones).
    pub fn category_axis(&self) -> AxisSpec {
        let scale = ScaleBandSpec::new(self.records.iter().map(|r| r.reason.clone()))
            .with_padding(self.style.padding);
        let mut axis = match self.orient {
            BarOrient::Horizontal => AxisSpec::left(CATEGORY_AXIS_ID, scale),
            BarOrient::Vertical => {
                AxisSpec::bottom(CATEGORY_AXIS_ID, scale).with_label_angle(-45.0)
            }
        }
        .with_label_font_size(self.style.label_font_size);
        axis.style.title_font_size = self.style.title_font_size;
        axis.label_wrap_width = self.label_wrap_width;
        axis.title.clone_from(&self.category_title);
        axis
    }

    /// The count axis (bottom for horizontal bars, left for vertical ones).
    pub fn value_axis(&self) -> AxisSpec {
        let scale = ScaleLinearSpec::new(self.value_domain()).with_nice(true);
        let orient = match self.orient {
            BarOrient::Horizontal => AxisOrient::Bottom,
            BarOrient::Vertical => AxisOrient::Left,
        };
        let mut axis = AxisSpec::new(VALUE_AXIS_ID, scale, orient)
            .with_tick_count(self.tick_count)
            .with_label_font_size(self.style.label_font_size);
        axis.style.title_font_size = self.style.title_font_size;
        axis.title.clone_from(&self.value_title);
        axis
    }

    /// Computes layout for this chart.
    pub fn layout(&self, measurer: &dyn TextMeasurer) -> ChartLayout {
        let mut spec = self.layout;
        if self.fit_margins || self.orient == BarOrient::Vertical {
            for axis in [self.category_axis(), self.value_axis()] {
                let extent = axis.measure(measurer);
                match axis.orient {
                    AxisOrient::Left => spec.axis_left = Some(extent),
                    AxisOrient::Bottom => spec.axis_bottom = Some(extent),
                }
            }
        }
        ChartLayout::arrange(&spec)
    }

    /// Produces the full mark list for one frame: bars, both axes and the citation.
    pub fn marks(&self, measurer: &dyn TextMeasurer) -> (ChartLayout, Vec<Mark>) {
        let layout = self.layout(measurer);
        let plot = layout.plot;
        let category = self.category_axis();
        let value = self.value_axis();

        let mut out = match (category.scale_band(plot), value.scale_linear(plot)) {
            (Some(band), Some(scale)) => BarMarkSpec::new(band, scale)
                .with_orient(self.orient)
                .with_fill(self.style.fill.clone())
                .with_hover_fill(self.style.hover_fill.clone())
                .with_hovered(self.hovered.clone())
                .with_visible(self.bars_visible)
                .marks(&self.records),
            _ => Vec::new(),
        };

        for axis in [&category, &value] {
            let axis_rect = match axis.orient {
                AxisOrient::Left => layout.axis_left,
                AxisOrient::Bottom => layout.axis_bottom,
            };
            out.extend(axis.marks(plot, axis_rect, measurer));
        }

        if let Some(citation) = &self.citation {
            out.push(
                Mark::builder(MarkId::from_raw(CITATION_ID))
                    .text()
                    .z_index(z_order::TITLES)
                    .x_const(plot.x0)
                    .y_const(layout.view.y1 - 5.0)
                    .text_const(citation.clone())
                    .font_size_const(self.style.citation_font_size)
                    .fill_brush_const(self.style.citation_fill.clone())
                    .text_anchor(TextAnchor::Start)
                    .build(),
            );
        }

        (layout, out)
    }
}
