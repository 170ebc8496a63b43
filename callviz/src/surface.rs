// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render capability and the controller that drives it.
//!
//! [`Controller`] owns the state and the retained [`Scene`]. Each frame it rebuilds the mark
//! list from the state, diffs it against the previous frame, starts transitions and hands the
//! result to a [`ChartSurface`]. Surfaces never see commands; they only present frames.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use callviz_charts::{BarChartSpec, ChartLayout, HeuristicTextMeasurer};
use callviz_core::{MarkDiff, Scene, TransitionSpec, Transitioner};
use log::{debug, trace};
use thiserror::Error;

use crate::command::Command;
use crate::state::ChartState;

/// Errors raised by a [`ChartSurface`].
#[derive(Debug, Error)]
pub(crate) enum SurfaceError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a surface needs to present one frame.
#[derive(Debug)]
pub(crate) struct Frame<'a> {
    pub(crate) layout: &'a ChartLayout,
    /// Changes since the previous frame.
    pub(crate) diffs: &'a [MarkDiff],
    /// Marks at their target state.
    pub(crate) scene: &'a Scene,
    /// In-flight tweens, already started for `diffs`.
    pub(crate) transitioner: &'a Transitioner,
    /// Clock time the frame was built at.
    pub(crate) now: Duration,
    pub(crate) state: &'a ChartState,
}

/// Something that can show a frame.
pub(crate) trait ChartSurface {
    fn present(&mut self, frame: &Frame<'_>) -> Result<(), SurfaceError>;
}

/// A monotonic time source for transitions.
pub(crate) trait Clock {
    /// Time since some fixed origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time since construction.
#[derive(Debug)]
pub(crate) struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Drives a surface from commands.
#[derive(Debug)]
pub(crate) struct Controller<S, C> {
    state: ChartState,
    template: BarChartSpec,
    scene: Scene,
    transitioner: Transitioner,
    measurer: HeuristicTextMeasurer,
    surface: S,
    clock: C,
}

impl<S: ChartSurface, C: Clock> Controller<S, C> {
    /// Creates a controller. Nothing is presented until [`Controller::render`].
    ///
    /// `template` supplies layout and style; its records are replaced every frame.
    pub(crate) fn new(
        state: ChartState,
        template: BarChartSpec,
        transition: TransitionSpec,
        surface: S,
        clock: C,
    ) -> Self {
        Self {
            state,
            template,
            scene: Scene::new(),
            transitioner: Transitioner::new(transition),
            measurer: HeuristicTextMeasurer,
            surface,
            clock,
        }
    }

    pub(crate) fn state(&self) -> &ChartState {
        &self.state
    }

    pub(crate) fn surface(&self) -> &S {
        &self.surface
    }

    /// The chart for the current state.
    pub(crate) fn chart(&self) -> BarChartSpec {
        self.template
            .clone()
            .with_records(self.state.visible().rows)
            .with_value_max(self.state.value_max())
            .with_hovered(self.state.hovered.clone())
            .with_bars_visible(self.state.bars_visible)
    }

    /// Builds, diffs and presents a frame for the current state.
    pub(crate) fn render(&mut self) -> Result<(), SurfaceError> {
        let now = self.clock.now();
        self.transitioner.settle(now);

        let (layout, marks) = self.chart().marks(&self.measurer);
        let diffs = self.scene.tick(marks);
        self.transitioner.begin(&diffs, now);
        debug!(
            "frame at {:?}: {} diffs, {} marks",
            now,
            diffs.len(),
            self.scene.len()
        );

        self.surface.present(&Frame {
            layout: &layout,
            diffs: &diffs,
            scene: &self.scene,
            transitioner: &self.transitioner,
            now,
            state: &self.state,
        })
    }

    /// Shows exactly the reasons in `keys` that are loaded, then renders.
    pub(crate) fn apply_filter<I, K>(&mut self, keys: I) -> Result<(), SurfaceError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.state.set_selection(keys);
        self.render()
    }

    /// Applies `command` and renders the resulting state.
    pub(crate) fn dispatch(&mut self, command: &Command) -> Result<(), SurfaceError> {
        trace!("dispatch {command}");
        self.state = command.apply(&self.state);
        self.render()
    }
}
