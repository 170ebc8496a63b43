// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy word wrapping for axis labels.

use smallvec::SmallVec;

use crate::{TextMeasurer, TextStyle};

/// Vertical distance between consecutive wrapped lines, in ems.
pub const LINE_HEIGHT_EM: f64 = 1.1;

/// One positioned line of a wrapped label.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelLine {
    /// Line content (words joined by single spaces).
    pub text: String,
    /// Offset from the first line, in ems (`index * LINE_HEIGHT_EM`).
    pub dy_em: f64,
}

/// A label broken into stacked lines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WrappedLabel {
    /// Lines in reading order.
    pub lines: SmallVec<[LabelLine; 3]>,
}

impl WrappedLabel {
    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the label had no words.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterates the line strings.
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(|l| l.text.as_str())
    }

    /// Widest measured line.
    pub fn max_width(&self, measurer: &dyn TextMeasurer, style: &TextStyle) -> f64 {
        self.lines
            .iter()
            .map(|l| measurer.measure(&l.text, style).advance_width)
            .fold(0.0, f64::max)
    }

    /// Total block height in ems, measured from the top of the first line.
    pub fn height_em(&self) -> f64 {
        match self.lines.len() {
            0 => 0.0,
            n => 1.0 + (n - 1) as f64 * LINE_HEIGHT_EM,
        }
    }
}

/// Wraps `text` so that each line measures at most `max_width`.
///
/// Words are separated by any run of whitespace and kept in order. Lines are filled greedily:
/// the next word is appended to the current line, and if the line then measures wider than
/// `max_width`, the word moves to a new line instead. A single word wider than `max_width` is
/// never split and overflows on its own line.
pub fn wrap_label(
    text: &str,
    max_width: f64,
    style: &TextStyle,
    measurer: &dyn TextMeasurer,
) -> WrappedLabel {
    let mut lines: SmallVec<[LabelLine; 3]> = SmallVec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate_len = current.len() + 1 + word.len();
        let mut candidate = String::with_capacity(candidate_len);
        candidate.push_str(&current);
        candidate.push(' ');
        candidate.push_str(word);
        if measurer.measure(&candidate, style).advance_width > max_width {
            push_line(core::mem::take(&mut current), &mut lines);
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        push_line(current, &mut lines);
    }

    WrappedLabel { lines }
}

fn push_line(text: String, lines: &mut SmallVec<[LabelLine; 3]>) {
    let dy_em = lines.len() as f64 * LINE_HEIGHT_EM;
    lines.push(LabelLine { text, dy_em });
}
