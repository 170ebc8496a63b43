// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! TOML chart configuration.
//!
//! Every field has a default, so an empty file (or no file) yields the stock 1000×600
//! horizontal chart.

use std::path::{Path, PathBuf};
use std::time::Duration;

use callviz_charts::{BarChartSpec, BarOrient, BarStyle, ChartLayoutSpec, Margin, Size};
use callviz_core::{EnterStyle, TransitionSpec};
use clap::ValueEnum;
use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::TOP_N;

/// Errors raised while loading or validating a [`ChartConfig`].
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid hex color `{0}`, expected #rrggbb")]
    Color(String),
    #[error("{0} must be positive")]
    NotPositive(&'static str),
}

/// Bar direction as written in the config file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// How new bars appear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum EnterAnimation {
    /// At their final geometry.
    #[default]
    Target,
    /// Growing out of the value baseline.
    Grow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct MarginConfig {
    pub(crate) top: f64,
    pub(crate) right: f64,
    pub(crate) bottom: f64,
    pub(crate) left: f64,
}

impl Default for MarginConfig {
    fn default() -> Self {
        let m = Margin::default();
        Self {
            top: m.top,
            right: m.right,
            bottom: m.bottom,
            left: m.left,
        }
    }
}

/// Chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ChartConfig {
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) margin: MarginConfig,
    /// Grow margins to fit measured axis labels.
    pub(crate) fit_margins: bool,
    pub(crate) top_n: usize,
    pub(crate) transition_ms: u64,
    pub(crate) enter: EnterAnimation,
    pub(crate) bar_fill: String,
    pub(crate) hover_fill: String,
    /// Category label wrap width in pixels. `0` disables wrapping.
    pub(crate) label_wrap_width: f64,
    pub(crate) label_font_size: f64,
    pub(crate) orientation: Orientation,
    /// CSV used when no `--input` is given.
    pub(crate) data: Option<PathBuf>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        let size = ChartLayoutSpec::default().view_size;
        Self {
            width: size.width,
            height: size.height,
            margin: MarginConfig::default(),
            fit_margins: false,
            top_n: TOP_N,
            transition_ms: 500,
            enter: EnterAnimation::default(),
            bar_fill: String::from("#0000ff"),
            hover_fill: String::from("#ffa500"),
            label_wrap_width: 180.0,
            label_font_size: 12.0,
            orientation: Orientation::default(),
            data: None,
        }
    }
}

impl ChartConfig {
    /// Reads and validates the TOML file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (name, v) in [
            ("width", self.width),
            ("height", self.height),
            ("label_font_size", self.label_font_size),
        ] {
            if v.is_nan() || v <= 0.0 {
                return Err(ConfigError::NotPositive(name));
            }
        }
        if self.top_n == 0 {
            return Err(ConfigError::NotPositive("top_n"));
        }
        parse_hex(&self.bar_fill)?;
        parse_hex(&self.hover_fill)?;
        Ok(())
    }

    pub(crate) fn orient(&self) -> BarOrient {
        match self.orientation {
            Orientation::Horizontal => BarOrient::Horizontal,
            Orientation::Vertical => BarOrient::Vertical,
        }
    }

    pub(crate) fn transition(&self) -> TransitionSpec {
        let enter = match (self.enter, self.orientation) {
            (EnterAnimation::Target, _) => EnterStyle::Target,
            (EnterAnimation::Grow, Orientation::Horizontal) => EnterStyle::GrowRight,
            (EnterAnimation::Grow, Orientation::Vertical) => EnterStyle::GrowUp,
        };
        TransitionSpec::default()
            .with_duration(Duration::from_millis(self.transition_ms))
            .with_enter(enter)
    }

    /// The chart template the controller fills with records each frame.
    pub(crate) fn chart_template(&self) -> Result<BarChartSpec, ConfigError> {
        let style = BarStyle {
            fill: parse_hex(&self.bar_fill)?.into(),
            hover_fill: parse_hex(&self.hover_fill)?.into(),
            label_font_size: self.label_font_size,
            ..BarStyle::default()
        };
        let layout = ChartLayoutSpec {
            view_size: Size::new(self.width, self.height),
            margin: Margin {
                top: self.margin.top,
                right: self.margin.right,
                bottom: self.margin.bottom,
                left: self.margin.left,
            },
            ..ChartLayoutSpec::default()
        };
        let wrap = (self.label_wrap_width > 0.0).then_some(self.label_wrap_width);
        Ok(BarChartSpec::new(Vec::new())
            .with_orient(self.orient())
            .with_layout(layout)
            .with_fit_margins(self.fit_margins)
            .with_label_wrap_width(wrap)
            .with_style(style))
    }
}

/// Parses `#rrggbb` (the leading `#` is optional).
pub(crate) fn parse_hex(s: &str) -> Result<Color, ConfigError> {
    let hex = s.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(ConfigError::Color(s.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ConfigError::Color(s.to_string()))
    };
    Ok(Color::from_rgb8(channel(0)?, channel(2)?, channel(4)?))
}
