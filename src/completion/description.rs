//! Shared description of the completion algorithm
//!
//! One description drives both the in-process engine and every shell
//! emitter: the walk rules are tried in order for each typed token, and the
//! candidate sources are concatenated in order.

use serde::{Deserialize, Serialize};

/// One step of the token walk. The first rule that claims a token wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WalkRule {
    /// The active slot takes the token.
    Absorb,
    /// A bare separator switches to positional-only mode.
    Separator,
    /// A subcommand name descends into that subcommand.
    Subcommand,
    /// An option invocation string activates the option's slot.
    OptionString,
    /// Anything else fills the next positional slot.
    Positional,
}

/// Where candidates come from once the walk is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CandidateSource {
    /// Subcommand names, only before any positional or active slot.
    Subcommands,
    /// Literal choices of the current slot.
    Choices,
    /// Dynamic provider bound to the current slot.
    Provider,
}

/// Candidate matching policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchCase {
    #[default]
    Sensitive,
    Insensitive,
}

/// The complete, shell-agnostic description of the completion algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineDescription {
    /// Words starting with this are completed as options.
    pub option_marker: String,
    /// Bare token that ends option and subcommand parsing.
    pub separator: String,
    pub walk: Vec<WalkRule>,
    pub sources: Vec<CandidateSource>,
    pub match_case: MatchCase,
}

impl EngineDescription {
    /// The standard algorithm.
    pub fn standard() -> Self {
        Self {
            option_marker: "-".to_string(),
            separator: "--".to_string(),
            walk: vec![
                WalkRule::Absorb,
                WalkRule::Separator,
                WalkRule::Subcommand,
                WalkRule::OptionString,
                WalkRule::Positional,
            ],
            sources: vec![
                CandidateSource::Subcommands,
                CandidateSource::Choices,
                CandidateSource::Provider,
            ],
            match_case: MatchCase::Sensitive,
        }
    }

    pub fn with_match_case(mut self, match_case: MatchCase) -> Self {
        self.match_case = match_case;
        self
    }

    /// Literal prefix test of `candidate` against the word being completed.
    pub fn matches(&self, candidate: &str, word: &str) -> bool {
        match self.match_case {
            MatchCase::Sensitive => candidate.starts_with(word),
            MatchCase::Insensitive => candidate.to_lowercase().starts_with(&word.to_lowercase()),
        }
    }

    pub fn looks_like_option(&self, word: &str) -> bool {
        !self.option_marker.is_empty() && word.starts_with(&self.option_marker)
    }
}

impl Default for EngineDescription {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_rule_order() {
        let desc = EngineDescription::standard();
        assert_eq!(desc.walk.first(), Some(&WalkRule::Absorb));
        assert_eq!(desc.walk.last(), Some(&WalkRule::Positional));
        assert_eq!(
            desc.sources,
            vec![
                CandidateSource::Subcommands,
                CandidateSource::Choices,
                CandidateSource::Provider
            ]
        );
    }

    #[test]
    fn test_matching_policy() {
        let desc = EngineDescription::standard();
        assert!(desc.matches("build", "bu"));
        assert!(desc.matches("build", ""));
        assert!(!desc.matches("Build", "bu"));

        let desc = desc.with_match_case(MatchCase::Insensitive);
        assert!(desc.matches("Build", "bu"));
        assert!(!desc.matches("test", "bu"));
    }

    #[test]
    fn test_option_marker() {
        let desc = EngineDescription::standard();
        assert!(desc.looks_like_option("-v"));
        assert!(desc.looks_like_option("--"));
        assert!(!desc.looks_like_option("file"));
        assert!(!desc.looks_like_option(""));
    }
}
