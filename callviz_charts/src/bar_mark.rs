// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bar mark generation.

use callviz_core::{Mark, MarkId};
use callviz_transforms::Record;
use log::warn;
use peniko::Brush;
use peniko::color::palette::css;

use crate::scale::{ScaleBand, ScaleLinear};

/// Direction bars grow in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BarOrient {
    /// Categories on the y axis, bars grow rightwards.
    #[default]
    Horizontal,
    /// Categories on the x axis, bars grow upwards.
    Vertical,
}

/// A bar mark derived from records.
///
/// This generates one [`callviz_core::MarkKind::Rect`] mark per record. Mark identity is
/// [`MarkId::for_key`] of the record's reason, so a bar keeps its id when rows are filtered,
/// reordered, or appended.
#[derive(Clone, Debug)]
pub struct BarMarkSpec {
    /// Band scale placing categories.
    pub band: ScaleBand,
    /// Linear scale mapping counts.
    pub value: ScaleLinear,
    /// Bar direction.
    pub orient: BarOrient,
    /// Baseline in data units (typically `0.0`).
    pub baseline: f64,
    /// Resting fill.
    pub fill: Brush,
    /// Fill while hovered.
    pub hover_fill: Brush,
    /// Reason currently under the pointer, painted with `hover_fill`.
    pub hovered: Option<String>,
    /// Whether bars are displayed.
    pub visible: bool,
    /// Rendering order hint (`callviz_core::Mark::z_index`).
    pub z_index: i32,
}

impl BarMarkSpec {
    /// Creates a horizontal bar spec with `baseline = 0`, blue bars and an orange hover fill.
    pub fn new(band: ScaleBand, value: ScaleLinear) -> Self {
        Self {
            band,
            value,
            orient: BarOrient::Horizontal,
            baseline: 0.0,
            fill: Brush::Solid(css::BLUE),
            hover_fill: Brush::Solid(css::ORANGE),
            hovered: None,
            visible: true,
            z_index: crate::z_order::SERIES_FILL,
        }
    }

    /// Sets the bar direction.
    pub fn with_orient(mut self, orient: BarOrient) -> Self {
        self.orient = orient;
        self
    }

    /// Sets the baseline in data units.
    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = baseline;
        self
    }

    /// Sets the resting fill.
    pub fn with_fill(mut self, fill: impl Into<Brush>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Sets the hover fill.
    pub fn with_hover_fill(mut self, fill: impl Into<Brush>) -> Self {
        self.hover_fill = fill.into();
        self
    }

    /// Marks `reason` as hovered.
    pub fn with_hovered(mut self, reason: Option<String>) -> Self {
        self.hovered = reason;
        self
    }

    /// Shows or hides every bar.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets the z-index used for render ordering.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Generates marks for `records`.
    ///
    /// Records whose reason is not in the band domain are skipped. A non-finite count yields a
    /// zero-length bar at the baseline.
    pub fn marks(&self, records: &[Record]) -> Vec<Mark> {
        let bw = self.band.band_width();
        let base = self.value.map(self.baseline);
        let mut out = Vec::with_capacity(records.len());

        for record in records {
            let Some(start) = self.band.position(&record.reason) else {
                log::debug!("bar {:?} is outside the band domain", record.reason);
                continue;
            };
            let count = if record.count.is_finite() {
                record.count
            } else {
                warn!(
                    "non-numeric count for {:?}; drawing an empty bar",
                    record.reason
                );
                self.baseline
            };
            let end = self.value.map(count);
            let fill = if self.hovered.as_deref() == Some(record.reason.as_str()) {
                self.hover_fill.clone()
            } else {
                self.fill.clone()
            };

            let builder = Mark::builder(MarkId::for_key(&record.reason))
                .rect()
                .z_index(self.z_index);
            let builder = match self.orient {
                BarOrient::Horizontal => builder
                    .x_const(base.min(end))
                    .y_const(start)
                    .w_const((end - base).abs())
                    .h_const(bw),
                BarOrient::Vertical => builder
                    .x_const(start)
                    .y_const(base.min(end))
                    .w_const(bw)
                    .h_const((end - base).abs()),
            };
            out.push(
                builder
                    .fill_brush_const(fill)
                    .hover_fill_brush_const(self.hover_fill.clone())
                    .visible(self.visible)
                    .build(),
            );
        }
        out
    }
}
