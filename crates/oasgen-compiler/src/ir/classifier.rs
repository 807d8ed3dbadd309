//! Decode-time key classification for map types.

use regex_automata::Input;
use regex_automata::dfa::{Automaton, StartKind, dense};

/// Where a decoder routes an object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Explicit property, by field index.
    Property(usize),
    /// First matching `patternProperties` entry.
    Pattern(usize),
    /// `additionalProperties` value type.
    Additional,
    /// No declared slot; the key is accepted and skipped.
    Ignored,
    /// `additionalProperties: false` and no pattern matched.
    Rejected,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("cannot compile pattern `{pattern}`: {message}")]
pub struct ClassifierError {
    pub pattern: String,
    pub message: String,
}

/// Decode priority for one map: explicit properties, then patterns in
/// declaration order, then additional properties.
///
/// Patterns are unanchored, as in JSON Schema, and a pattern match is
/// accepted even when the map is closed.
#[derive(Debug)]
pub struct KeyClassifier {
    props: Vec<String>,
    patterns: Vec<dense::DFA<Vec<u32>>>,
    additional: bool,
    closed: bool,
}

impl KeyClassifier {
    pub fn new(
        props: Vec<String>,
        patterns: &[String],
        additional: bool,
        closed: bool,
    ) -> Result<Self, ClassifierError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                dense::DFA::builder()
                    .configure(dense::DFA::config().start_kind(StartKind::Unanchored))
                    .build(pattern)
                    .map_err(|e| ClassifierError {
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            props,
            patterns,
            additional,
            closed,
        })
    }

    pub fn classify(&self, key: &str) -> KeyClass {
        if let Some(i) = self.props.iter().position(|p| p == key) {
            return KeyClass::Property(i);
        }
        if let Some(i) = self.patterns.iter().position(|dfa| is_match(dfa, key)) {
            return KeyClass::Pattern(i);
        }
        if self.additional {
            return KeyClass::Additional;
        }
        if self.closed {
            return KeyClass::Rejected;
        }
        KeyClass::Ignored
    }
}

fn is_match(dfa: &dense::DFA<Vec<u32>>, key: &str) -> bool {
    dfa.try_search_fwd(&Input::new(key))
        .ok()
        .flatten()
        .is_some()
}
