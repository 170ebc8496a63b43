// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tick label formatting.

/// Formats a tick value with `,` thousands separators, picking decimals from the tick `step`.
///
/// Steps of `1` or more print as grouped integers (`48213` becomes `"48,213"`). Smaller steps
/// print just enough decimals to tell neighbouring ticks apart. Non-finite values format as
/// `"NaN"`, `"∞"` or `"-∞"`.
pub fn format_tick_with_step(v: f64, step: f64) -> String {
    if v.is_nan() {
        return String::from("NaN");
    }
    if v.is_infinite() {
        return String::from(if v > 0.0 { "∞" } else { "-∞" });
    }
    let decimals = decimals_for_step(step);
    let v = if v == 0.0 { 0.0 } else { v };
    let mut s = format!("{:.*}", decimals, v.abs());
    if decimals > 0 {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let mut out = String::with_capacity(s.len() + s.len() / 3 + 1);
    if v < 0.0 && s.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

fn decimals_for_step(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 || step >= 1.0 {
        return 0;
    }
    let d = (-step.log10() - 1.0e-9).ceil();
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "value is positive and clamped to a handful of digits"
    )]
    {
        d.clamp(0.0, 6.0) as usize
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
