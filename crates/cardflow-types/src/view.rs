//! View mode enumeration.
//!
//! The view mode affects only how the presentation layer renders a
//! snapshot (full-information table view versus one seat's restricted
//! observation). It never influences scheduling, history, or the
//! engine.

use serde::{Deserialize, Serialize};

/// How the presentation layer should render snapshots for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Omniscient table view: all hands face-up.
    #[default]
    Observer,
    /// One participant's perspective: own hand hidden, knowledge shown.
    Agent,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_is_observer() {
        assert_eq!(ViewMode::default(), ViewMode::Observer);
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ViewMode::Observer).unwrap(),
            "\"observer\""
        );
        assert_eq!(serde_json::to_string(&ViewMode::Agent).unwrap(), "\"agent\"");
    }
}
