// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed transitions between scene frames.
//!
//! Time is passed in explicitly as a [`Duration`] since an arbitrary epoch, so the
//! transitioner works with any clock (and with fake clocks in tests).

use std::time::Duration;

use hashbrown::HashMap;
use kurbo::{BezPath, PathEl, Point, Rect};

use crate::mark::{MarkId, MarkPayload};
use crate::scene::MarkDiff;

/// Easing curve applied to transition progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ease {
    /// Constant speed.
    Linear,
    /// Symmetric cubic ease-in/ease-out.
    #[default]
    CubicInOut,
}

impl Ease {
    /// Maps linear progress `t` (clamped to `[0, 1]`) onto the eased curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::CubicInOut => {
                let t2 = 2.0 * t;
                if t2 <= 1.0 {
                    0.5 * t2 * t2 * t2
                } else {
                    let u = t2 - 2.0;
                    0.5 * (u * u * u + 2.0)
                }
            }
        }
    }
}

/// Where an entering rectangle starts its animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnterStyle {
    /// Enter directly at the target geometry.
    #[default]
    Target,
    /// Grow from zero width anchored at the left edge (horizontal bars).
    GrowRight,
    /// Grow from zero height anchored at the bottom edge (vertical bars).
    GrowUp,
}

/// Timing parameters for frame-to-frame transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionSpec {
    /// Total transition duration.
    pub duration: Duration,
    /// Easing curve.
    pub ease: Ease,
    /// Initial state for entering marks.
    pub enter: EnterStyle,
}

impl TransitionSpec {
    /// The default transition duration.
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(500);

    /// Sets the duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the easing curve.
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Sets the enter style.
    pub fn with_enter(mut self, enter: EnterStyle) -> Self {
        self.enter = enter;
        self
    }

    /// Eased progress after `elapsed`. A zero duration is always complete.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        self.ease.apply(elapsed.as_secs_f64() / self.duration.as_secs_f64())
    }
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self {
            duration: Self::DEFAULT_DURATION,
            ease: Ease::default(),
            enter: EnterStyle::default(),
        }
    }
}

#[derive(Clone, Debug)]
struct Tween {
    from: MarkPayload,
    to: MarkPayload,
    start: Duration,
}

/// Tracks in-flight tweens for a scene.
///
/// Feed every batch of [`MarkDiff`]s to [`Transitioner::begin`] and ask for the current
/// payload of a mark with [`Transitioner::sample`]. When a new batch arrives while a tween is
/// still running, the new tween starts from the geometry sampled at that moment, so marks
/// never jump back to a stale start or end state.
#[derive(Debug, Default)]
pub struct Transitioner {
    spec: TransitionSpec,
    tweens: HashMap<MarkId, Tween>,
    resting: HashMap<MarkId, MarkPayload>,
}

impl Transitioner {
    /// Creates a transitioner with the given timing.
    pub fn new(spec: TransitionSpec) -> Self {
        Self {
            spec,
            tweens: HashMap::new(),
            resting: HashMap::new(),
        }
    }

    /// Returns the timing parameters.
    pub fn spec(&self) -> TransitionSpec {
        self.spec
    }

    /// Starts tweens for a batch of diffs at time `now`.
    pub fn begin(&mut self, diffs: &[MarkDiff], now: Duration) {
        for diff in diffs {
            match diff {
                MarkDiff::Exit { id, .. } => {
                    self.tweens.remove(id);
                    self.resting.remove(id);
                }
                MarkDiff::Enter { id, new, .. } => {
                    let from = enter_from(new, self.spec.enter);
                    self.start(*id, from, (**new).clone(), now);
                }
                MarkDiff::Update { id, old, new, .. } => {
                    let from = self
                        .sample(*id, now)
                        .unwrap_or_else(|| (**old).clone());
                    self.start(*id, from, (**new).clone(), now);
                }
            }
        }
    }

    fn start(&mut self, id: MarkId, from: MarkPayload, to: MarkPayload, now: Duration) {
        if from == to || self.spec.duration.is_zero() {
            self.tweens.remove(&id);
            self.resting.insert(id, to);
        } else {
            self.resting.remove(&id);
            self.tweens.insert(
                id,
                Tween {
                    from,
                    to,
                    start: now,
                },
            );
        }
    }

    /// Returns the payload of `id` at time `now`, or `None` if the id is unknown.
    pub fn sample(&self, id: MarkId, now: Duration) -> Option<MarkPayload> {
        if let Some(tween) = self.tweens.get(&id) {
            let t = self.spec.progress(now.saturating_sub(tween.start));
            return Some(lerp_payload(&tween.from, &tween.to, t));
        }
        self.resting.get(&id).cloned()
    }

    /// Returns the start payload of the tween running for `id`, if any.
    pub fn origin(&self, id: MarkId) -> Option<&MarkPayload> {
        self.tweens.get(&id).map(|t| &t.from)
    }

    /// Returns `true` while any tween has not reached its end at `now`.
    pub fn is_animating(&self, now: Duration) -> bool {
        self.tweens
            .values()
            .any(|t| now.saturating_sub(t.start) < self.spec.duration)
    }

    /// Retires finished tweens into their resting state.
    pub fn settle(&mut self, now: Duration) {
        let duration = self.spec.duration;
        let done: Vec<MarkId> = self
            .tweens
            .iter()
            .filter(|(_, t)| now.saturating_sub(t.start) >= duration)
            .map(|(id, _)| *id)
            .collect();
        for id in done {
            if let Some(t) = self.tweens.remove(&id) {
                self.resting.insert(id, t.to);
            }
        }
    }
}

fn enter_from(target: &MarkPayload, style: EnterStyle) -> MarkPayload {
    let MarkPayload::Rect(r) = target else {
        return target.clone();
    };
    let mut from = r.clone();
    match style {
        EnterStyle::Target => {}
        EnterStyle::GrowRight => from.rect = Rect::new(r.rect.x0, r.rect.y0, r.rect.x0, r.rect.y1),
        EnterStyle::GrowUp => from.rect = Rect::new(r.rect.x0, r.rect.y1, r.rect.x1, r.rect.y1),
    }
    MarkPayload::Rect(from)
}

/// Interpolates geometry between two payloads at eased progress `t`.
///
/// Paint, text and visibility are taken from `to`. Rectangle corners and text anchors are
/// interpolated; paths are interpolated point-wise when both paths have the same element
/// structure and snap to `to` otherwise. Mismatched kinds snap to `to`.
pub fn lerp_payload(from: &MarkPayload, to: &MarkPayload, t: f64) -> MarkPayload {
    if t >= 1.0 {
        return to.clone();
    }
    match (from, to) {
        (MarkPayload::Rect(a), MarkPayload::Rect(b)) => {
            let mut out = b.clone();
            out.rect = Rect::new(
                lerp(a.rect.x0, b.rect.x0, t),
                lerp(a.rect.y0, b.rect.y0, t),
                lerp(a.rect.x1, b.rect.x1, t),
                lerp(a.rect.y1, b.rect.y1, t),
            );
            MarkPayload::Rect(out)
        }
        (MarkPayload::Text(a), MarkPayload::Text(b)) => {
            let mut out = b.clone();
            out.pos = a.pos.lerp(b.pos, t);
            MarkPayload::Text(out)
        }
        (MarkPayload::Path(a), MarkPayload::Path(b)) => {
            let mut out = b.clone();
            if let Some(path) = lerp_path(&a.path, &b.path, t) {
                out.path = path;
            }
            MarkPayload::Path(out)
        }
        _ => to.clone(),
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_path(a: &BezPath, b: &BezPath, t: f64) -> Option<BezPath> {
    let a = a.elements();
    let b = b.elements();
    if a.len() != b.len() {
        return None;
    }
    let mut out = BezPath::new();
    for (ea, eb) in a.iter().zip(b.iter()) {
        let p = |pa: Point, pb: Point| pa.lerp(pb, t);
        match (*ea, *eb) {
            (PathEl::MoveTo(pa), PathEl::MoveTo(pb)) => out.move_to(p(pa, pb)),
            (PathEl::LineTo(pa), PathEl::LineTo(pb)) => out.line_to(p(pa, pb)),
            (PathEl::ClosePath, PathEl::ClosePath) => out.close_path(),
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;
    use crate::{Mark, MarkPayload, Scene};

    fn bar(key: &str, width: f64) -> Mark {
        Mark::builder(MarkId::for_key(key))
            .rect()
            .w_const(width)
            .h_const(10.0)
            .build()
    }

    fn rect_of(p: Option<MarkPayload>) -> Rect {
        match p {
            Some(MarkPayload::Rect(r)) => r.rect,
            other => panic!("expected rect payload, got {other:?}"),
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn cubic_in_out_hits_endpoints_and_midpoint() {
        let e = Ease::CubicInOut;
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(1.0), 1.0);
        assert!((e.apply(0.5) - 0.5).abs() < 1e-12);
        assert!(e.apply(0.25) < 0.25, "slow start");
    }

    #[test]
    fn update_animates_over_the_configured_duration() {
        let id = MarkId::for_key("A");
        let mut scene = Scene::new();
        let mut tr = Transitioner::new(TransitionSpec::default().with_ease(Ease::Linear));

        tr.begin(&scene.tick([bar("A", 100.0)]), ms(0));
        assert_eq!(rect_of(tr.sample(id, ms(0))).width(), 100.0);

        tr.begin(&scene.tick([bar("A", 200.0)]), ms(1000));
        assert_eq!(rect_of(tr.sample(id, ms(1000))).width(), 100.0);
        assert!((rect_of(tr.sample(id, ms(1250))).width() - 150.0).abs() < 1e-9);
        assert_eq!(rect_of(tr.sample(id, ms(1500))).width(), 200.0);
        assert!(tr.is_animating(ms(1499)));
        assert!(!tr.is_animating(ms(1500)));
    }

    #[test]
    fn interrupted_transition_restarts_from_sampled_geometry() {
        let id = MarkId::for_key("A");
        let mut scene = Scene::new();
        let mut tr = Transitioner::new(TransitionSpec::default().with_ease(Ease::Linear));

        tr.begin(&scene.tick([bar("A", 100.0)]), ms(0));
        tr.begin(&scene.tick([bar("A", 200.0)]), ms(0));
        // Halfway through, a second update arrives.
        tr.begin(&scene.tick([bar("A", 0.0)]), ms(250));

        let origin = match tr.origin(id) {
            Some(MarkPayload::Rect(r)) => r.rect.width(),
            other => panic!("expected rect origin, got {other:?}"),
        };
        assert!((origin - 150.0).abs() < 1e-9, "origin was {origin}");
        assert!((rect_of(tr.sample(id, ms(500))).width() - 75.0).abs() < 1e-9);
        assert_eq!(rect_of(tr.sample(id, ms(750))).width(), 0.0);
    }

    #[test]
    fn grow_right_enters_from_zero_width() {
        let id = MarkId::for_key("A");
        let mut scene = Scene::new();
        let spec = TransitionSpec::default()
            .with_ease(Ease::Linear)
            .with_enter(EnterStyle::GrowRight);
        let mut tr = Transitioner::new(spec);
        tr.begin(&scene.tick([bar("A", 80.0)]), ms(0));
        assert_eq!(rect_of(tr.sample(id, ms(0))).width(), 0.0);
        assert!((rect_of(tr.sample(id, ms(250))).width() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn exits_are_removed_immediately() {
        let mut scene = Scene::new();
        let mut tr = Transitioner::new(TransitionSpec::default());
        tr.begin(&scene.tick([bar("A", 80.0)]), ms(0));
        tr.begin(&scene.tick(Vec::<Mark>::new()), ms(10));
        assert!(tr.sample(MarkId::for_key("A"), ms(10)).is_none());
    }

    #[test]
    fn settle_retires_finished_tweens() {
        let id = MarkId::for_key("A");
        let mut scene = Scene::new();
        let mut tr = Transitioner::new(TransitionSpec::default());
        tr.begin(&scene.tick([bar("A", 10.0)]), ms(0));
        tr.begin(&scene.tick([bar("A", 20.0)]), ms(0));
        tr.settle(ms(600));
        assert!(tr.origin(id).is_none());
        assert_eq!(rect_of(tr.sample(id, ms(600))).width(), 20.0);
    }

    #[test]
    fn paths_with_matching_structure_interpolate() {
        let mut a = BezPath::new();
        a.move_to((0.0, 0.0));
        a.line_to((0.0, 10.0));
        let mut b = BezPath::new();
        b.move_to((10.0, 0.0));
        b.line_to((10.0, 10.0));
        let Some(mid) = lerp_path(&a, &b, 0.5) else {
            panic!("paths should interpolate");
        };
        assert_eq!(mid.elements()[0], PathEl::MoveTo(Point::new(5.0, 0.0)));
    }
}
