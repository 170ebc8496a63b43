// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mark types and the mark builder.

use kurbo::{BezPath, Point, Rect, Shape};
use peniko::{Brush, Color};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Stable identity for a mark across frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkId(pub u64);

impl MarkId {
    /// Wraps a raw id.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Derives an id from a data key (64-bit FNV-1a of the key bytes).
    ///
    /// The same key always yields the same id, independent of the row the key sits in.
    pub fn for_key(key: &str) -> Self {
        Self::for_key_in(0, key)
    }

    /// Derives an id from a `(namespace, key)` pair.
    ///
    /// Use distinct namespaces when one data key owns several marks (a bar and its axis label,
    /// for example).
    pub fn for_key_in(namespace: u64, key: &str) -> Self {
        let mut hash = FNV_OFFSET;
        for b in namespace
            .to_le_bytes()
            .iter()
            .chain(key.as_bytes().iter())
        {
            hash ^= u64::from(*b);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        Self(hash)
    }

    /// Returns the id of the `index`-th child part of this mark (e.g. a wrapped label line).
    ///
    /// `child(0)` is distinct from `self`.
    pub fn child(self, index: u64) -> Self {
        let mut hash = self.0 ^ FNV_OFFSET;
        for b in (index + 1).to_le_bytes() {
            hash ^= u64::from(b);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        Self(hash)
    }
}

/// The kind of a mark, matching its payload variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkKind {
    /// An axis-aligned rectangle.
    Rect,
    /// A single line of text.
    Text,
    /// A filled and/or stroked path.
    Path,
}

/// Horizontal text anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextAnchor {
    /// Text starts at the anchor point.
    Start,
    /// Text is centered on the anchor point.
    Middle,
    /// Text ends at the anchor point.
    End,
}

/// Vertical text baseline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextBaseline {
    /// Alphabetic baseline.
    Alphabetic,
    /// Vertically centered.
    Middle,
    /// Hanging baseline (text hangs below `y`).
    Hanging,
    /// Ideographic baseline.
    Ideographic,
}

/// Resolved rectangle state.
#[derive(Clone, Debug, PartialEq)]
pub struct RectPayload {
    /// Geometry in scene coordinates.
    pub rect: Rect,
    /// Resting fill.
    pub fill: Brush,
    /// Fill used while the pointer is over the mark, if the mark is interactive.
    pub hover_fill: Option<Brush>,
    /// Whether the mark is displayed. Hidden marks keep their identity.
    pub visible: bool,
}

/// Resolved text state.
#[derive(Clone, Debug, PartialEq)]
pub struct TextPayload {
    /// Anchor position.
    pub pos: Point,
    /// Unshaped text content.
    pub text: String,
    /// Font size in scene coordinates.
    pub font_size: f64,
    /// Rotation around `pos`, in degrees.
    pub angle: f64,
    /// Horizontal anchor.
    pub anchor: TextAnchor,
    /// Vertical baseline.
    pub baseline: TextBaseline,
    /// Fill paint.
    pub fill: Brush,
}

/// Resolved path state.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPayload {
    /// Path geometry.
    pub path: BezPath,
    /// Fill paint.
    pub fill: Brush,
    /// Stroke paint.
    pub stroke: Brush,
    /// Stroke width; `0` disables stroking.
    pub stroke_width: f64,
}

/// The resolved visual state of a mark.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkPayload {
    /// Rectangle payload.
    Rect(RectPayload),
    /// Text payload.
    Text(TextPayload),
    /// Path payload.
    Path(PathPayload),
}

impl MarkPayload {
    /// Returns the mark kind for this payload.
    pub fn kind(&self) -> MarkKind {
        match self {
            Self::Rect(_) => MarkKind::Rect,
            Self::Text(_) => MarkKind::Text,
            Self::Path(_) => MarkKind::Path,
        }
    }

    /// Returns geometric bounds where they are known without text metrics.
    ///
    /// Text marks return `None`; renderers estimate text extents themselves.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(r.rect),
            Self::Text(_) => None,
            Self::Path(p) => Some(p.path.bounding_box()),
        }
    }
}

/// A single visual item with stable identity.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    /// Stable id used to join frames.
    pub id: MarkId,
    /// Mark kind (mirrors `payload`).
    pub kind: MarkKind,
    /// Render order; renderers sort by `(z_index, id)`.
    pub z_index: i32,
    /// Resolved visual state.
    pub payload: MarkPayload,
}

impl Mark {
    /// Starts building a mark. The builder defaults to a rectangle.
    pub fn builder(id: MarkId) -> MarkBuilder {
        MarkBuilder {
            id,
            z_index: 0,
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
            payload: default_rect(),
        }
    }
}

fn default_rect() -> MarkPayload {
    MarkPayload::Rect(RectPayload {
        rect: Rect::ZERO,
        fill: Brush::default(),
        hover_fill: None,
        visible: true,
    })
}

/// Builder for [`Mark`].
///
/// Setters that do not apply to the current kind are ignored, so callers can share encoding
/// code between kinds.
#[derive(Clone, Debug)]
pub struct MarkBuilder {
    id: MarkId,
    z_index: i32,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    payload: MarkPayload,
}

impl MarkBuilder {
    /// Switches to a rectangle mark.
    pub fn rect(mut self) -> Self {
        self.payload = default_rect();
        self
    }

    /// Switches to a text mark.
    pub fn text(mut self) -> Self {
        self.payload = MarkPayload::Text(TextPayload {
            pos: Point::ZERO,
            text: String::new(),
            font_size: 12.0,
            angle: 0.0,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Alphabetic,
            fill: Brush::default(),
        });
        self
    }

    /// Switches to a path mark.
    pub fn path(mut self) -> Self {
        self.payload = MarkPayload::Path(PathPayload {
            path: BezPath::new(),
            fill: Brush::default(),
            stroke: Brush::Solid(Color::TRANSPARENT),
            stroke_width: 0.0,
        });
        self
    }

    /// Sets the render order.
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Sets x (rect origin or text anchor).
    pub fn x_const(mut self, x: f64) -> Self {
        self.x = x;
        self
    }

    /// Sets y (rect origin or text anchor).
    pub fn y_const(mut self, y: f64) -> Self {
        self.y = y;
        self
    }

    /// Sets the rectangle width.
    pub fn w_const(mut self, w: f64) -> Self {
        self.w = w;
        self
    }

    /// Sets the rectangle height.
    pub fn h_const(mut self, h: f64) -> Self {
        self.h = h;
        self
    }

    /// Sets a solid fill.
    pub fn fill_const(self, color: Color) -> Self {
        self.fill_brush_const(Brush::Solid(color))
    }

    /// Sets the fill paint.
    pub fn fill_brush_const(mut self, fill: Brush) -> Self {
        match &mut self.payload {
            MarkPayload::Rect(r) => r.fill = fill,
            MarkPayload::Text(t) => t.fill = fill,
            MarkPayload::Path(p) => p.fill = fill,
        }
        self
    }

    /// Sets the hover fill of a rectangle.
    pub fn hover_fill_brush_const(mut self, fill: Brush) -> Self {
        if let MarkPayload::Rect(r) = &mut self.payload {
            r.hover_fill = Some(fill);
        }
        self
    }

    /// Shows or hides a rectangle.
    pub fn visible(mut self, visible: bool) -> Self {
        if let MarkPayload::Rect(r) = &mut self.payload {
            r.visible = visible;
        }
        self
    }

    /// Sets the text content.
    pub fn text_const(mut self, text: impl Into<String>) -> Self {
        if let MarkPayload::Text(t) = &mut self.payload {
            t.text = text.into();
        }
        self
    }

    /// Sets the font size.
    pub fn font_size_const(mut self, font_size: f64) -> Self {
        if let MarkPayload::Text(t) = &mut self.payload {
            t.font_size = font_size;
        }
        self
    }

    /// Sets the text rotation in degrees.
    pub fn angle_const(mut self, angle: f64) -> Self {
        if let MarkPayload::Text(t) = &mut self.payload {
            t.angle = angle;
        }
        self
    }

    /// Sets the text anchor.
    pub fn text_anchor(mut self, anchor: TextAnchor) -> Self {
        if let MarkPayload::Text(t) = &mut self.payload {
            t.anchor = anchor;
        }
        self
    }

    /// Shorthand for `text_anchor(TextAnchor::Middle)`.
    pub fn text_anchor_middle(self) -> Self {
        self.text_anchor(TextAnchor::Middle)
    }

    /// Shorthand for `text_anchor(TextAnchor::End)`.
    pub fn text_anchor_end(self) -> Self {
        self.text_anchor(TextAnchor::End)
    }

    /// Sets the text baseline.
    pub fn text_baseline(mut self, baseline: TextBaseline) -> Self {
        if let MarkPayload::Text(t) = &mut self.payload {
            t.baseline = baseline;
        }
        self
    }

    /// Sets the path geometry.
    pub fn path_const(mut self, path: BezPath) -> Self {
        if let MarkPayload::Path(p) = &mut self.payload {
            p.path = path;
        }
        self
    }

    /// Sets the stroke paint of a path.
    pub fn stroke_brush_const(mut self, stroke: Brush) -> Self {
        if let MarkPayload::Path(p) = &mut self.payload {
            p.stroke = stroke;
        }
        self
    }

    /// Sets the stroke width of a path.
    pub fn stroke_width_const(mut self, stroke_width: f64) -> Self {
        if let MarkPayload::Path(p) = &mut self.payload {
            p.stroke_width = stroke_width;
        }
        self
    }

    /// Finishes the mark.
    pub fn build(self) -> Mark {
        let mut payload = self.payload;
        match &mut payload {
            MarkPayload::Rect(r) => {
                r.rect = Rect::from_origin_size((self.x, self.y), (self.w, self.h)).abs();
            }
            MarkPayload::Text(t) => t.pos = Point::new(self.x, self.y),
            MarkPayload::Path(_) => {}
        }
        Mark {
            id: self.id,
            kind: payload.kind(),
            z_index: self.z_index,
            payload,
        }
    }
}
