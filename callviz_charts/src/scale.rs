// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scales: a categorical band scale and a linear scale with "nice" domains.

use hashbrown::HashMap;

/// A scale specification (domain + options, no range yet).
#[derive(Clone, Debug)]
pub enum ScaleSpec {
    /// Continuous linear scale.
    Linear(ScaleLinearSpec),
    /// Categorical band scale.
    Band(ScaleBandSpec),
}

impl From<ScaleLinearSpec> for ScaleSpec {
    fn from(value: ScaleLinearSpec) -> Self {
        Self::Linear(value)
    }
}

impl From<ScaleBandSpec> for ScaleSpec {
    fn from(value: ScaleBandSpec) -> Self {
        Self::Band(value)
    }
}

/// A linear mapping from a continuous domain to a continuous range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLinear {
    /// Creates a new scale mapping `domain` values to `range` values.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a value from domain space into range space.
    ///
    /// A degenerate domain maps everything to the start of the range.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 {
            return r0;
        }
        let t = (x - d0) / denom;
        r0 + t * (r1 - r0)
    }

    /// Returns the domain.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Returns the range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Returns “nice-ish” tick values covering the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain.0, self.domain.1, count)
    }
}

/// Specification for a linear scale (domain + options, no range yet).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinearSpec {
    /// Domain in data units.
    pub domain: (f64, f64),
    /// Whether to extend the domain to round tick values.
    pub nice: bool,
}

impl ScaleLinearSpec {
    /// Creates a new linear scale spec.
    pub fn new(domain: (f64, f64)) -> Self {
        Self {
            domain,
            nice: false,
        }
    }

    /// Enables or disables nice-domain behavior.
    pub fn with_nice(mut self, nice: bool) -> Self {
        self.nice = nice;
        self
    }

    /// Returns the effective domain after applying `nice` (if enabled).
    pub fn resolved_domain(&self, tick_count: usize) -> (f64, f64) {
        let (mut lo, mut hi) = self.domain;
        if !self.nice || tick_count == 0 || !(lo.is_finite() && hi.is_finite()) || lo == hi {
            return self.domain;
        }
        if lo > hi {
            core::mem::swap(&mut lo, &mut hi);
        }
        // Widening can change the step, so repeat until it settles.
        let mut prev = None;
        for _ in 0..10 {
            let step = nice_step((hi - lo) / tick_count as f64);
            if step == 0.0 || prev == Some(step) {
                break;
            }
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
            prev = Some(step);
        }
        (lo, hi)
    }

    /// Instantiates a concrete scale for `range` using the resolved domain.
    pub fn instantiate(&self, range: (f64, f64), tick_count: usize) -> ScaleLinear {
        ScaleLinear::new(self.resolved_domain(tick_count), range)
    }
}

fn nice_ticks(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return vec![min];
    }
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }
    let step = nice_step((max - min) / count as f64);
    if step == 0.0 {
        return vec![min, max];
    }

    let start = (min / step).floor() * step;
    let stop = (max / step).ceil() * step;

    let n_f = ((stop - start) / step).round();
    let n = if n_f.is_finite() && n_f >= 0.0 {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "guarded by finite/non-negative checks and capped at 10k"
        )]
        {
            n_f.min(10_000.0) as u64
        }
    } else {
        0
    };
    (0..=n).map(|i| start + step * i as f64).collect()
}

/// Rounds a raw tick step to 1, 2 or 5 times a power of ten.
///
/// The cut-offs are the geometric midpoints √2, √10 and √50, matching d3's `tickIncrement`.
fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let base = 10_f64.powf(power);
    let error = step / base;
    let nice = if error >= 50_f64.sqrt() {
        10.0
    } else if error >= 10_f64.sqrt() {
        5.0
    } else if error >= core::f64::consts::SQRT_2 {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// A categorical band scale.
///
/// Each domain key owns a contiguous band of the range. Padding follows the usual band-scale
/// convention: `padding_inner` is the fraction of a step left empty between bands and
/// `padding_outer` is the number of steps reserved before the first and after the last band.
/// Leftover space is split evenly between both ends.
#[derive(Clone, Debug)]
pub struct ScaleBand {
    domain: Vec<String>,
    index: HashMap<String, usize>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
}

impl ScaleBand {
    /// Creates a band scale over `domain` covering `range`, without padding.
    ///
    /// Duplicate keys keep their first band.
    pub fn new<I, S>(domain: I, range: (f64, f64)) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domain: Vec<String> = domain.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(domain.len());
        for (i, key) in domain.iter().enumerate() {
            index.entry(key.clone()).or_insert(i);
        }
        Self {
            domain,
            index,
            range,
            padding_inner: 0.0,
            padding_outer: 0.0,
        }
    }

    /// Sets inner and outer padding.
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = inner.clamp(0.0, 1.0);
        self.padding_outer = outer.max(0.0);
        self
    }

    /// Returns the domain keys in band order.
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// Returns the number of bands.
    pub fn count(&self) -> usize {
        self.domain.len()
    }

    /// Distance between the starts of adjacent bands.
    pub fn step(&self) -> f64 {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        let denom = (n - self.padding_inner + 2.0 * self.padding_outer).max(1.0);
        (r1 - r0).abs() / denom
    }

    /// Returns the computed band width (`0` for an empty domain).
    pub fn band_width(&self) -> f64 {
        if self.domain.is_empty() {
            return 0.0;
        }
        self.step() * (1.0 - self.padding_inner)
    }

    /// Returns the band index of `key`.
    pub fn index(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Returns the start position of the band at `index`.
    ///
    /// Bands are laid out from `range.0` towards `range.1`.
    pub fn start(&self, index: usize) -> f64 {
        let (r0, r1) = self.range;
        let n = self.domain.len() as f64;
        let step = self.step();
        let used = step * (n - self.padding_inner);
        let offset = 0.5 * ((r1 - r0).abs() - used);
        let along = offset + step * index as f64;
        if r1 >= r0 {
            r0 + along
        } else {
            r0 - along - self.band_width()
        }
    }

    /// Returns the start position of the band for `key`.
    pub fn position(&self, key: &str) -> Option<f64> {
        self.index(key).map(|i| self.start(i))
    }

    /// Returns the center position of the band for `key`.
    pub fn center(&self, key: &str) -> Option<f64> {
        self.position(key).map(|p| p + 0.5 * self.band_width())
    }
}

/// Specification for a band scale (domain + padding, no range yet).
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleBandSpec {
    /// Domain keys in band order.
    pub domain: Vec<String>,
    /// Inner padding (fraction of a step).
    pub padding_inner: f64,
    /// Outer padding (in steps).
    pub padding_outer: f64,
}

impl ScaleBandSpec {
    /// Creates a band scale spec without padding.
    pub fn new<I, S>(domain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domain: domain.into_iter().map(Into::into).collect(),
            padding_inner: 0.0,
            padding_outer: 0.0,
        }
    }

    /// Sets inner and outer padding to the same value.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding_inner = padding;
        self.padding_outer = padding;
        self
    }

    /// Instantiates a concrete scale for a given output range.
    pub fn instantiate(&self, range: (f64, f64)) -> ScaleBand {
        ScaleBand::new(self.domain.iter().cloned(), range)
            .with_padding(self.padding_inner, self.padding_outer)
    }
}
