// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG output for presented frames.
//!
//! Interaction that a static file can still express is written as SMIL: hover recolouring
//! uses `<set>` and geometry changes use `<animate>` starting at the tween origin.

use std::path::PathBuf;
use std::time::Duration;

use callviz_core::{
    MarkDiff, MarkId, MarkPayload, RectPayload, TextAnchor, TextBaseline, TextPayload,
    Transitioner,
};
use hashbrown::HashMap;
use kurbo::Rect;
use log::info;
use peniko::Brush;

use crate::html;
use crate::surface::{ChartSurface, Frame, SurfaceError};

/// `cubic-in-out` as an SVG key spline.
const CUBIC_IN_OUT_SPLINE: &str = "0.645 0.045 0.355 1";

/// A retained copy of the scene, kept in sync through diffs.
#[derive(Debug, Default)]
pub(crate) struct SvgScene {
    marks: HashMap<MarkId, (i32, MarkPayload)>,
    view_box: Option<Rect>,
}

impl SvgScene {
    pub(crate) fn set_view_box(&mut self, view_box: Rect) {
        self.view_box = Some(view_box);
    }

    pub(crate) fn apply_diffs(&mut self, diffs: &[MarkDiff]) {
        for diff in diffs {
            match diff {
                MarkDiff::Enter {
                    id, z_index, new, ..
                } => {
                    self.marks.insert(*id, (*z_index, (**new).clone()));
                }
                MarkDiff::Update {
                    id,
                    new_z_index,
                    new,
                    ..
                } => {
                    self.marks.insert(*id, (*new_z_index, (**new).clone()));
                }
                MarkDiff::Exit { id, .. } => {
                    self.marks.remove(id);
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.marks.len()
    }

    /// Renders the scene. Marks with a running tween in `transitions` animate from its origin.
    pub(crate) fn to_svg_string(&self, transitions: Option<&Transitioner>) -> String {
        let view_box = match (self.view_box, self.content_bounds()) {
            (Some(a), Some(b)) => a.union(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => Rect::new(0.0, 0.0, 100.0, 100.0),
        };
        let mut out = String::new();

        out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" "#);
        out.push_str(&format!(
            r#"viewBox="{} {} {} {}" width="{}" height="{}" preserveAspectRatio="xMinYMin meet">"#,
            view_box.x0,
            view_box.y0,
            view_box.width(),
            view_box.height(),
            view_box.width(),
            view_box.height()
        ));
        out.push('\n');

        let mut entries: Vec<_> = self.marks.iter().collect();
        entries.sort_by_key(|(id, (z, _))| (*z, id.0));

        let dur = transitions.map(|t| t.spec().duration);
        for (id, (_z, payload)) in entries {
            let origin = transitions.and_then(|t| t.origin(*id));
            match payload {
                MarkPayload::Rect(r) => write_rect(&mut out, *id, r, origin, dur),
                MarkPayload::Text(t) => write_text(&mut out, t, origin, dur),
                MarkPayload::Path(p) => {
                    let d = p.path.to_svg();
                    out.push_str(&format!(r#"<path d="{d}""#));
                    write_paint_attr(&mut out, "fill", &p.fill);
                    if p.stroke_width > 0.0 {
                        write_paint_attr(&mut out, "stroke", &p.stroke);
                        out.push_str(&format!(r#" stroke-width="{}""#, p.stroke_width));
                    }
                    out.push_str("/>\n");
                }
            }
        }

        out.push_str("</svg>\n");
        out
    }

    fn content_bounds(&self) -> Option<Rect> {
        let mut rect: Option<Rect> = None;
        for (_z, payload) in self.marks.values() {
            let b = match payload {
                MarkPayload::Text(t) => Some(estimate_text_bounds_anchored(
                    t.pos.x,
                    t.pos.y,
                    t.font_size,
                    t.anchor,
                    t.baseline,
                    &t.text,
                )),
                MarkPayload::Rect(r) if !r.visible => None,
                _ => payload.bounds(),
            };
            let Some(b) = b else { continue };
            rect = Some(rect.map_or(b, |r| r.union(b)));
        }
        rect.map(|r| r.inflate(10.0, 10.0))
    }
}

fn write_rect(
    out: &mut String,
    id: MarkId,
    r: &RectPayload,
    origin: Option<&MarkPayload>,
    dur: Option<Duration>,
) {
    out.push_str(&format!(
        r#"<rect id="m{:016x}" x="{}" y="{}" width="{}" height="{}""#,
        id.0,
        r.rect.x0,
        r.rect.y0,
        r.rect.width(),
        r.rect.height(),
    ));
    write_paint_attr(out, "fill", &r.fill);
    if !r.visible {
        out.push_str(r#" display="none""#);
    }
    let mut children = String::new();
    if let (Some(MarkPayload::Rect(from)), Some(dur)) = (origin, dur)
        && from.rect != r.rect
    {
        for (name, a, b) in [
            ("x", from.rect.x0, r.rect.x0),
            ("y", from.rect.y0, r.rect.y0),
            ("width", from.rect.width(), r.rect.width()),
            ("height", from.rect.height(), r.rect.height()),
        ] {
            if a != b {
                write_animate(&mut children, name, a, b, dur);
            }
        }
    }
    if let Some(hover) = &r.hover_fill {
        let (value, _) = svg_paint(hover);
        children.push_str(&format!(
            r#"<set attributeName="fill" to="{value}" begin="mouseover" end="mouseout"/>"#
        ));
    }
    if children.is_empty() {
        out.push_str("/>\n");
    } else {
        out.push('>');
        out.push_str(&children);
        out.push_str("</rect>\n");
    }
}

fn write_text(
    out: &mut String,
    t: &TextPayload,
    origin: Option<&MarkPayload>,
    dur: Option<Duration>,
) {
    let baseline = match t.baseline {
        TextBaseline::Middle => "middle",
        TextBaseline::Alphabetic => "alphabetic",
        TextBaseline::Hanging => "hanging",
        TextBaseline::Ideographic => "ideographic",
    };
    out.push_str(&format!(
        r#"<text x="{}" y="{}" font-size="{}" dominant-baseline="{}""#,
        t.pos.x, t.pos.y, t.font_size, baseline
    ));
    if t.angle != 0.0 {
        out.push_str(&format!(
            r#" transform="rotate({} {} {})""#,
            t.angle, t.pos.x, t.pos.y
        ));
    }
    out.push_str(match t.anchor {
        TextAnchor::Start => r#" text-anchor="start""#,
        TextAnchor::Middle => r#" text-anchor="middle""#,
        TextAnchor::End => r#" text-anchor="end""#,
    });
    write_paint_attr(out, "fill", &t.fill);
    out.push('>');
    // Rotation is pinned to the target position, so rotated labels do not slide.
    if let (Some(MarkPayload::Text(from)), Some(dur)) = (origin, dur)
        && t.angle == 0.0
    {
        if from.pos.x != t.pos.x {
            write_animate(out, "x", from.pos.x, t.pos.x, dur);
        }
        if from.pos.y != t.pos.y {
            write_animate(out, "y", from.pos.y, t.pos.y, dur);
        }
    }
    out.push_str(&escape_xml(&t.text));
    out.push_str("</text>\n");
}

fn write_animate(out: &mut String, attribute: &str, from: f64, to: f64, dur: Duration) {
    out.push_str(&format!(
        r#"<animate attributeName="{attribute}" from="{from}" to="{to}" dur="{}ms" fill="freeze" calcMode="spline" keyTimes="0;1" keySplines="{CUBIC_IN_OUT_SPLINE}"/>"#,
        dur.as_millis()
    ));
}

fn estimate_text_bounds_anchored(
    x: f64,
    y: f64,
    font_size: f64,
    anchor: TextAnchor,
    baseline: TextBaseline,
    text: &str,
) -> Rect {
    // Assume ~0.6em average glyph width.
    let glyph_w = 0.6 * font_size;
    let width = glyph_w * text.chars().count() as f64;
    let half_height = 0.5 * font_size;
    let y_midline = match baseline {
        TextBaseline::Middle => y,
        TextBaseline::Alphabetic => y - 0.3 * font_size,
        TextBaseline::Hanging => y + 0.3 * font_size,
        TextBaseline::Ideographic => y - 0.2 * font_size,
    };
    let (x0, x1) = match anchor {
        TextAnchor::Start => (x, x + width),
        TextAnchor::Middle => (x - width / 2.0, x + width / 2.0),
        TextAnchor::End => (x - width, x),
    };
    Rect::new(x0, y_midline - half_height, x1, y_midline + half_height)
}

fn svg_paint(brush: &Brush) -> (String, Option<f64>) {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            let fill = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
            let fill_opacity = if rgba.a == 255 {
                None
            } else {
                Some(f64::from(rgba.a) / 255.0)
            };
            (fill, fill_opacity)
        }
        _ => ("none".to_string(), None),
    }
}

fn write_paint_attr(out: &mut String, name: &str, brush: &Brush) {
    let (value, opacity) = svg_paint(brush);
    out.push_str(&format!(r#" {name}="{value}""#));
    if let Some(o) = opacity {
        out.push_str(&format!(r#" {name}-opacity="{o}""#));
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Output document type for a [`FileSurface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Svg,
    /// The SVG embedded in a report page with the checkbox list.
    Html,
}

impl OutputFormat {
    /// `Html` for `.html`/`.htm` paths, `Svg` otherwise.
    pub(crate) fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") => {
                Self::Html
            }
            _ => Self::Svg,
        }
    }
}

/// Rewrites one file on every frame.
#[derive(Debug)]
pub(crate) struct FileSurface {
    path: PathBuf,
    format: OutputFormat,
    scene: SvgScene,
    title: String,
}

impl FileSurface {
    pub(crate) fn new(path: PathBuf, title: impl Into<String>) -> Self {
        let format = OutputFormat::from_path(&path);
        Self {
            path,
            format,
            scene: SvgScene::default(),
            title: title.into(),
        }
    }

    pub(crate) fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Renders the document for `frame` without writing it.
    pub(crate) fn render_document(&mut self, frame: &Frame<'_>) -> String {
        self.scene.set_view_box(frame.layout.view);
        self.scene.apply_diffs(frame.diffs);
        let animating = frame.transitioner.is_animating(frame.now);
        let svg = self
            .scene
            .to_svg_string(animating.then_some(frame.transitioner));
        match self.format {
            OutputFormat::Svg => svg,
            OutputFormat::Html => {
                let description = format!(
                    "{} of {} loaded reasons shown.",
                    frame.state.visible().row_count(),
                    frame.state.dataset.row_count()
                );
                html::render_report(
                    &self.title,
                    &[html::HtmlSection {
                        title: "Top reasons",
                        description: &description,
                        svg,
                        checkboxes: frame
                            .state
                            .checkboxes()
                            .map(|(r, c)| (r.to_string(), c))
                            .collect(),
                    }],
                )
            }
        }
    }
}

impl ChartSurface for FileSurface {
    fn present(&mut self, frame: &Frame<'_>) -> Result<(), SurfaceError> {
        let document = self.render_document(frame);
        std::fs::write(&self.path, document).map_err(|source| SurfaceError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!("wrote {} ({} marks)", self.path.display(), self.scene.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use callviz_core::{Mark, Scene, TransitionSpec};
    use peniko::color::palette::css;

    use super::*;

    fn bar(key: &str, rect: Rect, visible: bool) -> Mark {
        Mark::builder(MarkId::for_key(key))
            .rect()
            .x_const(rect.x0)
            .y_const(rect.y0)
            .w_const(rect.width())
            .h_const(rect.height())
            .fill_const(css::BLUE)
            .hover_fill_brush_const(css::ORANGE.into())
            .visible(visible)
            .build()
    }

    #[test]
    fn bars_carry_hover_and_visibility() {
        let mut scene = Scene::new();
        let diffs = scene.tick([
            bar("A", Rect::new(0.0, 0.0, 50.0, 10.0), true),
            bar("B", Rect::new(0.0, 20.0, 30.0, 30.0), false),
        ]);
        let mut svg = SvgScene::default();
        svg.apply_diffs(&diffs);
        let out = svg.to_svg_string(None);
        assert_eq!(out.matches("<rect").count(), 2);
        assert_eq!(
            out.matches(r##"<set attributeName="fill" to="#ffa500" begin="mouseover" end="mouseout"/>"##)
                .count(),
            2
        );
        assert_eq!(out.matches(r#"display="none""#).count(), 1);
        assert!(!out.contains("<animate"));
    }

    #[test]
    fn updates_animate_from_the_tween_origin() {
        let mut scene = Scene::new();
        let mut transitions = Transitioner::new(TransitionSpec::default());
        let mut svg = SvgScene::default();

        let first = scene.tick([bar("A", Rect::new(0.0, 0.0, 50.0, 10.0), true)]);
        transitions.begin(&first, Duration::ZERO);
        svg.apply_diffs(&first);

        let second = scene.tick([bar("A", Rect::new(0.0, 0.0, 80.0, 10.0), true)]);
        transitions.begin(&second, Duration::from_millis(10));
        svg.apply_diffs(&second);

        let out = svg.to_svg_string(Some(&transitions));
        assert!(
            out.contains(r#"<animate attributeName="width" from="50" to="80" dur="500ms""#),
            "{out}"
        );
        assert!(!out.contains(r#"attributeName="x""#), "x did not move");
    }

    #[test]
    fn exits_are_removed_and_text_is_escaped() {
        let mut scene = Scene::new();
        let label = Mark::builder(MarkId::from_raw(7))
            .text()
            .x_const(5.0)
            .y_const(5.0)
            .text_const("Rodent <Activity> & \"Pests\"")
            .build();
        let mut svg = SvgScene::default();
        svg.apply_diffs(&scene.tick([
            bar("A", Rect::new(0.0, 0.0, 1.0, 1.0), true),
            label.clone(),
        ]));
        svg.apply_diffs(&scene.tick([label]));
        let out = svg.to_svg_string(None);
        assert!(!out.contains("<rect"));
        assert!(out.contains("Rodent &lt;Activity&gt; &amp; &quot;Pests&quot;"));
    }

    #[test]
    fn view_box_grows_to_fit_overhanging_text() {
        let mut svg = SvgScene::default();
        svg.set_view_box(Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut scene = Scene::new();
        let label = Mark::builder(MarkId::from_raw(1))
            .text()
            .x_const(0.0)
            .y_const(50.0)
            .text_const("A long label")
            .text_anchor_end()
            .build();
        svg.apply_diffs(&scene.tick([label]));
        let out = svg.to_svg_string(None);
        assert!(!out.contains(r#"viewBox="0 0 100 100""#), "{out}");
    }
}
