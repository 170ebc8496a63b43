// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User commands as pure state transitions.

use core::fmt;
use core::str::FromStr;

use callviz_transforms::concat;
use log::{debug, warn};
use thiserror::Error;

use crate::state::ChartState;

/// A discrete user action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// Checks or unchecks one checkbox.
    SetChecked { reason: String, checked: bool },
    /// Checks every checkbox.
    SelectAll,
    /// Unchecks everything.
    Reset,
    /// Appends the rows past the initial head, each with a checked checkbox. A second call
    /// does nothing.
    ShowMore,
    /// Hides or shows the bars without changing their identity.
    ToggleVisibility,
    /// Pointer entered a bar.
    Hover(String),
    /// Pointer left the hovered bar.
    Leave,
}

impl Command {
    /// Returns the state after this command.
    pub(crate) fn apply(&self, state: &ChartState) -> ChartState {
        let mut next = state.clone();
        match self {
            Self::SetChecked { reason, checked } => {
                if state.dataset.get(reason).is_none() {
                    warn!("no checkbox for {reason:?}");
                    return next;
                }
                if *checked {
                    next.selection.insert(reason.clone());
                } else {
                    next.selection.remove(reason.as_str());
                }
            }
            Self::SelectAll => {
                next.selection = state.dataset.reasons().map(String::from).collect();
            }
            Self::Reset => next.selection.clear(),
            Self::ShowMore => {
                if state.expanded {
                    debug!("show more: already expanded");
                    return next;
                }
                let tail = state.tail();
                next.selection.extend(tail.reasons().map(String::from));
                next.dataset = concat(&state.dataset, &tail);
                next.expanded = true;
            }
            Self::ToggleVisibility => next.bars_visible = !state.bars_visible,
            Self::Hover(reason) => {
                if state.visible().get(reason).is_some() {
                    next.hovered = Some(reason.clone());
                } else {
                    debug!("hover over {reason:?} ignored: not rendered");
                }
            }
            Self::Leave => next.hovered = None,
        }
        next.clear_stale_hover();
        next
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetChecked {
                reason,
                checked: true,
            } => write!(f, "check {reason}"),
            Self::SetChecked {
                reason,
                checked: false,
            } => write!(f, "uncheck {reason}"),
            Self::SelectAll => f.write_str("select-all"),
            Self::Reset => f.write_str("reset"),
            Self::ShowMore => f.write_str("show-more"),
            Self::ToggleVisibility => f.write_str("toggle"),
            Self::Hover(reason) => write!(f, "hover {reason}"),
            Self::Leave => f.write_str("leave"),
        }
    }
}

/// Errors raised while parsing a [`Command`].
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{0}` needs a reason")]
    MissingReason(&'static str),
}

impl FromStr for Command {
    type Err = CommandParseError;

    /// Parses `check <reason>`, `uncheck <reason>`, `select-all`, `reset`, `show-more`,
    /// `toggle`, `hover <reason>` or `leave`. Reasons may contain spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (verb, rest) = match s.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (s, ""),
        };
        let reason = |name: &'static str| {
            if rest.is_empty() {
                Err(CommandParseError::MissingReason(name))
            } else {
                Ok(rest.to_string())
            }
        };
        match verb.to_ascii_lowercase().as_str() {
            "" => Err(CommandParseError::Empty),
            "check" => Ok(Self::SetChecked {
                reason: reason("check")?,
                checked: true,
            }),
            "uncheck" => Ok(Self::SetChecked {
                reason: reason("uncheck")?,
                checked: false,
            }),
            "select-all" => Ok(Self::SelectAll),
            "reset" => Ok(Self::Reset),
            "show-more" => Ok(Self::ShowMore),
            "toggle" => Ok(Self::ToggleVisibility),
            "hover" => Ok(Self::Hover(reason("hover")?)),
            "leave" => Ok(Self::Leave),
            _ => Err(CommandParseError::Unknown(verb.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use callviz_transforms::{ReasonTable, Record};

    use super::*;

    fn state(n: usize, top: usize) -> ChartState {
        let table: ReasonTable = (0..n)
            .map(|i| Record::new(format!("r{i}"), (n - i) as f64))
            .collect();
        ChartState::new(&table, top)
    }

    #[test]
    fn uncheck_then_check_round_trips_the_selection() {
        let s0 = state(3, 3);
        let s1 = Command::SetChecked {
            reason: "r1".into(),
            checked: false,
        }
        .apply(&s0);
        assert!(!s1.selection.contains("r1"));
        assert_eq!(s1.visible().row_count(), 2);
        let s2 = Command::SetChecked {
            reason: "r1".into(),
            checked: true,
        }
        .apply(&s1);
        assert_eq!(s2, s0);
    }

    #[test]
    fn checking_an_unknown_reason_is_a_no_op() {
        let s0 = state(4, 2);
        let s1 = Command::SetChecked {
            reason: "r3".into(),
            checked: true,
        }
        .apply(&s0);
        assert_eq!(s1, s0);
    }

    #[test]
    fn show_more_is_idempotent() {
        let s1 = Command::ShowMore.apply(&state(5, 2));
        assert!(s1.expanded);
        assert_eq!(s1.dataset.row_count(), 5);
        assert_eq!(s1.visible().row_count(), 5);
        assert_eq!(Command::ShowMore.apply(&s1), s1);
    }

    #[test]
    fn appended_rows_get_their_own_checkboxes() {
        let s1 = Command::ShowMore.apply(&state(4, 2));
        assert_eq!(s1.checkboxes().count(), 4);
        assert!(s1.checkboxes().all(|(_, checked)| checked));

        let s2 = Command::SetChecked {
            reason: "r3".into(),
            checked: false,
        }
        .apply(&s1);
        assert_eq!(s2.visible().reasons().collect::<Vec<_>>(), ["r0", "r1", "r2"]);

        let s3 = Command::Reset.apply(&s2);
        assert!(s3.visible().is_empty());
        let s4 = Command::SelectAll.apply(&s3);
        assert_eq!(s4.visible().row_count(), 4);
    }

    #[test]
    fn hover_follows_the_rendered_bars() {
        let s0 = state(3, 3);
        let hovered = Command::Hover("r2".into()).apply(&s0);
        assert_eq!(hovered.hovered.as_deref(), Some("r2"));
        assert_eq!(Command::Leave.apply(&hovered).hovered, None);
        assert_eq!(Command::Reset.apply(&hovered).hovered, None);
        assert_eq!(Command::Hover("nope".into()).apply(&s0).hovered, None);
    }

    #[test]
    fn parses_every_verb() {
        let cases = [
            (
                "check Street Lights",
                Command::SetChecked {
                    reason: "Street Lights".into(),
                    checked: true,
                },
            ),
            (
                "  uncheck   Needle Pickup ",
                Command::SetChecked {
                    reason: "Needle Pickup".into(),
                    checked: false,
                },
            ),
            ("select-all", Command::SelectAll),
            ("RESET", Command::Reset),
            ("show-more", Command::ShowMore),
            ("toggle", Command::ToggleVisibility),
            ("hover A", Command::Hover("A".into())),
            ("leave", Command::Leave),
        ];
        for (text, expected) in cases {
            assert_eq!(text.parse::<Command>(), Ok(expected.clone()), "{text}");
            assert_eq!(expected.to_string().parse::<Command>(), Ok(expected));
        }
    }

    #[test]
    fn parse_errors_name_the_problem() {
        assert_eq!("".parse::<Command>(), Err(CommandParseError::Empty));
        assert_eq!(
            "check".parse::<Command>(),
            Err(CommandParseError::MissingReason("check"))
        );
        assert_eq!(
            "explode now".parse::<Command>(),
            Err(CommandParseError::Unknown("explode".into()))
        );
    }
}
