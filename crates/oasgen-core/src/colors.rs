//! ANSI styling for terminal output.
//!
//! Only standard 16-color codes are used, so output reads in both light and
//! dark themes. A disabled palette paints nothing.

use std::fmt;

/// Semantic roles in CLI output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    /// Type and operation names, counts.
    Name,
    /// Media types and string literals.
    Literal,
    /// Paths, locations and other secondary text.
    Dim,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Name => "\x1b[34m",
            Style::Literal => "\x1b[32m",
            Style::Dim => "\x1b[2m",
        }
    }
}

const RESET: &str = "\x1b[0m";

#[derive(Clone, Copy, Debug, Default)]
pub struct Colors {
    enabled: bool,
}

impl Colors {
    pub const ON: Self = Self { enabled: true };
    pub const OFF: Self = Self { enabled: false };

    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Wrap `value` so that its `Display` output is styled.
    pub fn paint<T: fmt::Display>(&self, style: Style, value: T) -> Painted<T> {
        Painted {
            style: self.enabled.then_some(style),
            value,
        }
    }
}

pub struct Painted<T> {
    style: Option<Style>,
    value: T,
}

impl<T: fmt::Display> fmt::Display for Painted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            Some(style) => write!(f, "{}{}{}", style.code(), self.value, RESET),
            None => self.value.fmt(f),
        }
    }
}
