//! Auto-grouping rules.
//!
//! Pure, side-effect-free evaluation of a rule set against a window
//! descriptor. The engine never mutates anything; the caller decides what
//! to do with the returned target group name.

pub mod matching;
pub mod types;

pub use matching::{evaluate, rule_matches};
pub use types::{AutoGroupRule, MatchKind};
