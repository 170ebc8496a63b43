// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis mark generation.
//!
//! A single [`AxisSpec`] with an `orient` of `left` or `bottom` can be measured (for layout)
//! and arranged (to generate marks). Band axes key their ticks and labels by category, so a
//! label keeps its [`MarkId`] when the domain is filtered or extended and only moves.

use std::sync::Arc;

use callviz_core::{Mark, MarkId, TextAnchor, TextBaseline};
use callviz_text::{LINE_HEIGHT_EM, TextMeasurer, TextStyle, WrappedLabel, wrap_label};
use kurbo::{BezPath, Point, Rect};
use peniko::{Brush, Color};
use peniko::color::palette::css;

use crate::format::format_tick_with_step;
use crate::scale::{ScaleBand, ScaleLinear, ScaleSpec};
use crate::z_order;

const TICK_NAMESPACE: u64 = 1;
const LABEL_NAMESPACE: u64 = 2;
const TITLE_OFFSET: u64 = 9000;

/// A paint + width pair for stroked paths (domain lines, ticks).
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke paint.
    pub brush: Brush,
    /// Stroke width in scene coordinates.
    pub stroke_width: f64,
}

impl StrokeStyle {
    /// Convenience for a solid stroke.
    pub fn solid(brush: impl Into<Brush>, stroke_width: f64) -> Self {
        Self {
            brush: brush.into(),
            stroke_width,
        }
    }

    /// A straight axis rule from `a` to `b` in this stroke.
    fn rule(&self, id: MarkId, a: Point, b: Point) -> Mark {
        let mut path = BezPath::new();
        path.move_to(a);
        path.line_to(b);
        Mark::builder(id)
            .path()
            .path_const(path)
            .z_index(z_order::AXIS_RULES)
            .fill_const(Color::TRANSPARENT)
            .stroke_brush_const(self.brush.clone())
            .stroke_width_const(self.stroke_width)
            .build()
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::solid(css::BLACK, 1.0)
    }
}

/// Axis styling defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisStyle {
    /// Style for the axis domain line and tick marks.
    pub rule: StrokeStyle,
    /// Fill paint for tick labels.
    pub label_fill: Brush,
    /// Font size for tick labels.
    pub label_font_size: f64,
    /// Fill paint for the axis title.
    pub title_fill: Brush,
    /// Font size for the axis title.
    pub title_font_size: f64,
}

impl Default for AxisStyle {
    fn default() -> Self {
        let rule = StrokeStyle::default();
        Self {
            rule: rule.clone(),
            label_fill: rule.brush.clone(),
            label_font_size: 12.0,
            title_fill: rule.brush,
            title_font_size: 14.0,
        }
    }
}

/// Axis orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisOrient {
    /// A horizontal axis placed below the plot area.
    Bottom,
    /// A vertical axis placed to the left of the plot area.
    Left,
}

/// An axis specification.
#[derive(Clone)]
pub struct AxisSpec {
    /// Stable-id base; generated marks derive their ids from this base.
    pub id_base: u64,
    /// The axis scale specification.
    pub scale: ScaleSpec,
    /// Axis placement relative to the plot.
    pub orient: AxisOrient,
    /// Approximate number of ticks (linear scales only).
    pub tick_count: usize,
    /// Tick line length.
    pub tick_size: f64,
    /// Whether to draw tick marks.
    pub ticks: bool,
    /// Whether to draw tick labels.
    pub labels: bool,
    /// Whether to draw the axis domain line.
    pub show_domain: bool,
    /// Gap between the tick end and the tick label.
    pub tick_padding: f64,
    /// Axis styling.
    pub style: AxisStyle,
    /// Optional axis title text.
    pub title: Option<String>,
    /// Distance from the outer edge of the axis rectangle to the title baseline.
    pub title_inset: f64,
    /// Maximum measured width of a band label line; longer labels wrap.
    ///
    /// `None` keeps each label on one line.
    pub label_wrap_width: Option<f64>,
    /// Tick label rotation angle in degrees.
    pub label_angle: f64,
    /// Optional tick label formatter for linear scales.
    ///
    /// The second argument is the tick step.
    pub tick_formatter: Option<Arc<dyn Fn(f64, f64) -> String>>,
}

impl core::fmt::Debug for AxisSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AxisSpec")
            .field("id_base", &self.id_base)
            .field("scale", &self.scale)
            .field("orient", &self.orient)
            .field("tick_count", &self.tick_count)
            .field("tick_size", &self.tick_size)
            .field("ticks", &self.ticks)
            .field("labels", &self.labels)
            .field("show_domain", &self.show_domain)
            .field("tick_padding", &self.tick_padding)
            .field("style", &self.style)
            .field("title", &self.title)
            .field("title_inset", &self.title_inset)
            .field("label_wrap_width", &self.label_wrap_width)
            .field("label_angle", &self.label_angle)
            .field("tick_formatter", &self.tick_formatter.is_some())
            .finish()
    }
}

/// One tick: its key, position along the axis, and label.
struct Tick {
    key: String,
    pos: f64,
    label: WrappedLabel,
}

impl AxisSpec {
    /// Creates a new axis specification.
    ///
    /// The returned axis has `tick_count = 10`, `tick_size = 6`, `tick_padding = 3`, the default
    /// style, no title and no label wrapping.
    pub fn new(id_base: u64, scale: impl Into<ScaleSpec>, orient: AxisOrient) -> Self {
        let title_inset = match orient {
            AxisOrient::Bottom => 10.0,
            AxisOrient::Left => 20.0,
        };
        Self {
            id_base,
            scale: scale.into(),
            orient,
            tick_count: 10,
            tick_size: 6.0,
            ticks: true,
            labels: true,
            show_domain: true,
            tick_padding: 3.0,
            style: AxisStyle::default(),
            title: None,
            title_inset,
            label_wrap_width: None,
            label_angle: 0.0,
            tick_formatter: None,
        }
    }

    /// Convenience constructor for a `bottom` axis.
    pub fn bottom(id_base: u64, scale: impl Into<ScaleSpec>) -> Self {
        Self::new(id_base, scale, AxisOrient::Bottom)
    }

    /// Convenience constructor for a `left` axis.
    pub fn left(id_base: u64, scale: impl Into<ScaleSpec>) -> Self {
        Self::new(id_base, scale, AxisOrient::Left)
    }

    /// Set the approximate tick count.
    pub fn with_tick_count(mut self, tick_count: usize) -> Self {
        self.tick_count = tick_count;
        self
    }

    /// Set tick size in scene coordinates.
    pub fn with_tick_size(mut self, tick_size: f64) -> Self {
        self.tick_size = tick_size;
        self
    }

    /// Enable or disable tick marks.
    pub fn with_ticks(mut self, ticks: bool) -> Self {
        self.ticks = ticks;
        self
    }

    /// Enable or disable tick labels.
    pub fn with_labels(mut self, labels: bool) -> Self {
        self.labels = labels;
        self
    }

    /// Enable or disable the axis domain line.
    pub fn with_domain(mut self, domain: bool) -> Self {
        self.show_domain = domain;
        self
    }

    /// Set tick padding in scene coordinates.
    pub fn with_tick_padding(mut self, tick_padding: f64) -> Self {
        self.tick_padding = tick_padding;
        self
    }

    /// Set the axis style.
    pub fn with_style(mut self, style: AxisStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the tick label font size.
    pub fn with_label_font_size(mut self, font_size: f64) -> Self {
        self.style.label_font_size = font_size;
        self
    }

    /// Set the axis title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the distance from the outer axis edge to the title baseline.
    pub fn with_title_inset(mut self, title_inset: f64) -> Self {
        self.title_inset = title_inset;
        self
    }

    /// Wrap band labels to `width`.
    pub fn with_label_wrap_width(mut self, width: f64) -> Self {
        self.label_wrap_width = Some(width);
        self
    }

    /// Set tick label rotation angle in degrees.
    pub fn with_label_angle(mut self, angle_degrees: f64) -> Self {
        self.label_angle = angle_degrees;
        self
    }

    /// Set a custom tick label formatter.
    pub fn with_tick_formatter(mut self, f: impl Fn(f64, f64) -> String + 'static) -> Self {
        self.tick_formatter = Some(Arc::new(f));
        self
    }

    fn range(&self, plot: Rect) -> (f64, f64) {
        match (self.orient, &self.scale) {
            (AxisOrient::Bottom, _) => (plot.x0, plot.x1),
            // Categories read top to bottom; values grow upwards.
            (AxisOrient::Left, ScaleSpec::Band(_)) => (plot.y0, plot.y1),
            (AxisOrient::Left, ScaleSpec::Linear(_)) => (plot.y1, plot.y0),
        }
    }

    /// Returns the linear scale for `plot`, or `None` for a band axis.
    pub fn scale_linear(&self, plot: Rect) -> Option<ScaleLinear> {
        match &self.scale {
            ScaleSpec::Linear(s) => Some(s.instantiate(self.range(plot), self.tick_count)),
            ScaleSpec::Band(_) => None,
        }
    }

    /// Returns the band scale for `plot`, or `None` for a linear axis.
    pub fn scale_band(&self, plot: Rect) -> Option<ScaleBand> {
        match &self.scale {
            ScaleSpec::Band(s) => Some(s.instantiate(self.range(plot))),
            ScaleSpec::Linear(_) => None,
        }
    }

    fn label_style(&self) -> TextStyle {
        TextStyle::new(self.style.label_font_size)
    }

    fn format_tick(&self, v: f64, step: f64) -> String {
        match &self.tick_formatter {
            Some(f) => (f)(v, step),
            None => format_tick_with_step(v, step),
        }
    }

    fn wrap(&self, text: &str, measurer: &dyn TextMeasurer) -> WrappedLabel {
        match self.label_wrap_width {
            Some(width) => wrap_label(text, width, &self.label_style(), measurer),
            None => wrap_label(text, f64::INFINITY, &self.label_style(), measurer),
        }
    }

    /// Tick keys, positions (`None` when no plot is known yet) and labels.
    fn ticks_for(&self, plot: Option<Rect>, measurer: &dyn TextMeasurer) -> Vec<Tick> {
        match &self.scale {
            ScaleSpec::Band(spec) => {
                let band = plot.map(|p| spec.instantiate(self.range(p)));
                spec.domain
                    .iter()
                    .map(|key| Tick {
                        key: key.clone(),
                        pos: band
                            .as_ref()
                            .and_then(|b| b.center(key))
                            .unwrap_or(0.0),
                        label: self.wrap(key, measurer),
                    })
                    .collect()
            }
            ScaleSpec::Linear(spec) => {
                let domain = spec.resolved_domain(self.tick_count);
                let scale = ScaleLinear::new(domain, plot.map_or((0.0, 1.0), |p| self.range(p)));
                let values = scale.ticks(self.tick_count);
                let step = tick_step(&values);
                let (lo, hi) = (domain.0.min(domain.1), domain.0.max(domain.1));
                values
                    .into_iter()
                    .filter(|v| *v >= lo - 1.0e-9 && *v <= hi + 1.0e-9)
                    .map(|v| Tick {
                        // Keyed by value so a custom formatter cannot collide ids.
                        key: format_tick_with_step(v, step),
                        pos: scale.map(v),
                        label: self.wrap(&self.format_tick(v, step), measurer),
                    })
                    .collect()
            }
        }
    }

    /// Measure the thickness this axis needs along its normal direction.
    ///
    /// This is intended for a measure/arrange layout pass.
    pub fn measure(&self, measurer: &dyn TextMeasurer) -> f64 {
        let tick_extent = if self.ticks {
            self.tick_size.abs()
        } else {
            0.0
        };
        let style = self.label_style();
        let mut max_label_extent = 0.0_f64;
        if self.labels {
            let theta = self.label_angle.to_radians();
            let sin = theta.sin().abs();
            let cos = theta.cos().abs();
            for tick in self.ticks_for(None, measurer) {
                let w = tick.label.max_width(measurer, &style);
                let h = tick.label.height_em() * style.font_size;
                let extent = match self.orient {
                    AxisOrient::Bottom => sin * w + cos * h,
                    AxisOrient::Left => cos * w + sin * h,
                };
                max_label_extent = max_label_extent.max(extent);
            }
        }
        let label_thickness = if self.labels && max_label_extent > 0.0 {
            self.tick_padding.max(0.0) + max_label_extent
        } else {
            0.0
        };
        let mut out = tick_extent + label_thickness;
        if self.title.is_some() {
            out += self.title_inset.max(0.0) + self.style.title_font_size;
        }
        out
    }

    /// Generate axis marks for the given plot rectangle and arranged axis rectangle.
    ///
    /// `axis_rect` is the reserved region for this axis, adjacent to `plot`; the title is placed
    /// relative to its outer edge.
    pub fn marks(&self, plot: Rect, axis_rect: Rect, measurer: &dyn TextMeasurer) -> Vec<Mark> {
        let ticks = self.ticks_for(Some(plot), measurer);
        let mut out = Vec::new();

        if self.show_domain {
            let (a, b) = match self.orient {
                AxisOrient::Bottom => (Point::new(plot.x0, plot.y1), Point::new(plot.x1, plot.y1)),
                AxisOrient::Left => (Point::new(plot.x0, plot.y0), Point::new(plot.x0, plot.y1)),
            };
            out.push(self.style.rule.rule(MarkId::from_raw(self.id_base), a, b));
        }

        let tick_size = self.tick_size.abs();
        let tick_extent = if self.ticks { tick_size } else { 0.0 };
        let font_size = self.style.label_font_size;
        let line_step = LINE_HEIGHT_EM * font_size;

        for tick in &ticks {
            if self.ticks {
                let id = MarkId::for_key_in(self.id_base + TICK_NAMESPACE, &tick.key);
                let (a, b) = match self.orient {
                    AxisOrient::Bottom => (
                        Point::new(tick.pos, plot.y1),
                        Point::new(tick.pos, plot.y1 + tick_size),
                    ),
                    AxisOrient::Left => (
                        Point::new(plot.x0 - tick_size, tick.pos),
                        Point::new(plot.x0, tick.pos),
                    ),
                };
                out.push(self.style.rule.rule(id, a, b));
            }

            if !self.labels {
                continue;
            }
            let label_id = MarkId::for_key_in(self.id_base + LABEL_NAMESPACE, &tick.key);
            // The wrapped block is centred on the tick; lines keep their 1.1em spacing.
            let block_offset = 0.5 * (tick.label.len().saturating_sub(1)) as f64 * line_step;
            for (i, line) in tick.label.lines.iter().enumerate() {
                let dy = line.dy_em * font_size;
                let (x, y, anchor, baseline) = match self.orient {
                    AxisOrient::Left => (
                        plot.x0 - tick_extent - self.tick_padding,
                        tick.pos - block_offset + dy,
                        TextAnchor::End,
                        TextBaseline::Middle,
                    ),
                    AxisOrient::Bottom => {
                        let anchor = if self.label_angle == 0.0 {
                            TextAnchor::Middle
                        } else {
                            TextAnchor::End
                        };
                        (
                            tick.pos,
                            plot.y1 + tick_extent + self.tick_padding + dy,
                            anchor,
                            TextBaseline::Hanging,
                        )
                    }
                };
                out.push(
                    Mark::builder(label_id.child(i as u64))
                        .text()
                        .z_index(z_order::AXIS_LABELS)
                        .x_const(x)
                        .y_const(y)
                        .text_const(line.text.clone())
                        .text_anchor(anchor)
                        .text_baseline(baseline)
                        .angle_const(self.label_angle)
                        .font_size_const(font_size)
                        .fill_brush_const(self.style.label_fill.clone())
                        .build(),
                );
            }
        }

        if let Some(title) = &self.title {
            let (x, y, angle) = match self.orient {
                AxisOrient::Bottom => (
                    0.5 * (plot.x0 + plot.x1),
                    axis_rect.y1 - self.title_inset,
                    0.0,
                ),
                AxisOrient::Left => (
                    axis_rect.x0 + self.title_inset,
                    0.5 * (plot.y0 + plot.y1),
                    -90.0,
                ),
            };
            out.push(
                Mark::builder(MarkId::from_raw(self.id_base + TITLE_OFFSET))
                    .text()
                    .z_index(z_order::AXIS_TITLES)
                    .x_const(x)
                    .y_const(y)
                    .text_const(title.clone())
                    .font_size_const(self.style.title_font_size)
                    .fill_brush_const(self.style.title_fill.clone())
                    .text_anchor_middle()
                    .angle_const(angle)
                    .build(),
            );
        }

        out
    }
}

fn tick_step(ticks: &[f64]) -> f64 {
    let step = ticks
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(f64::INFINITY, f64::min);
    if step.is_finite() { step } else { 0.0 }
}
