//! Completion engine - orchestrates the completion flow
//!
//! Ties the pieces together: the token stream is walked by the state machine,
//! the final state becomes a [`CompletionContext`], and the context selects
//! which index tables and providers candidates are drawn from.

use std::collections::HashSet;

use tracing::debug;

use super::context::CompletionContext;
use super::description::{CandidateSource, EngineDescription};
use super::fsm::WalkState;
use super::provider::ProviderRegistry;
use super::token_stream::TokenStream;
use crate::index::CompletionIndex;

/// In-process completion engine over a built index
#[derive(Debug, Clone)]
pub struct CompletionEngine<'a> {
    index: &'a CompletionIndex,
    description: EngineDescription,
    providers: ProviderRegistry,
}

impl<'a> CompletionEngine<'a> {
    /// Engine with the standard algorithm and the builtin providers
    pub fn new(index: &'a CompletionIndex) -> Self {
        Self {
            index,
            description: EngineDescription::standard(),
            providers: ProviderRegistry::with_builtins(),
        }
    }

    pub fn with_description(mut self, description: EngineDescription) -> Self {
        self.description = description;
        self
    }

    pub fn with_providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    pub fn description(&self) -> &EngineDescription {
        &self.description
    }

    /// Candidates for `word`, given the words typed before it.
    ///
    /// `tokens` excludes the program name. Never fails: every anomaly
    /// degrades to fewer candidates.
    pub fn complete(&self, tokens: &[String], word: &str) -> Vec<String> {
        let state = WalkState::run(self.index, &self.description, tokens);
        let context = state.to_context(self.index, &self.description, word);
        let candidates = self.fetch_candidates(&context);

        debug!(
            tokens = tokens.len(),
            word,
            context = ?context,
            candidates = candidates.len(),
            "completion"
        );
        candidates
    }

    pub fn complete_stream(&self, stream: &TokenStream) -> Vec<String> {
        self.complete(stream.tokens_before_cursor(), stream.current_prefix())
    }

    /// Complete a whole command line with the cursor at byte `pos`.
    pub fn complete_line(&self, line: &str, pos: usize) -> Vec<String> {
        self.complete_stream(&TokenStream::from_line(line, pos))
    }

    fn fetch_candidates(&self, context: &CompletionContext) -> Vec<String> {
        let mut out = Candidates::new(&self.description, context.word());

        match context {
            CompletionContext::Options { node, .. } => {
                out.extend(self.index.option_strings(node));
            }
            CompletionContext::Slot {
                node,
                slot,
                subcommands,
                word,
            } => {
                for source in &self.description.sources {
                    match source {
                        CandidateSource::Subcommands if *subcommands => {
                            out.extend(self.index.subcommands(node));
                        }
                        CandidateSource::Subcommands => {}
                        CandidateSource::Choices => {
                            out.extend(self.index.choices(node, slot));
                        }
                        CandidateSource::Provider => {
                            if let Some(id) = self.index.provider(node, slot) {
                                out.extend(&self.providers.invoke(id, word));
                            }
                        }
                    }
                }
            }
        }

        out.items
    }
}

/// Prefix-filtered, first-seen-deduplicated candidate list
struct Candidates<'a> {
    description: &'a EngineDescription,
    word: &'a str,
    seen: HashSet<String>,
    items: Vec<String>,
}

impl<'a> Candidates<'a> {
    fn new(description: &'a EngineDescription, word: &'a str) -> Self {
        Self {
            description,
            word,
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }

    fn extend(&mut self, values: &[String]) {
        for value in values {
            if value.is_empty() || !self.description.matches(value, self.word) {
                continue;
            }
            if self.seen.insert(value.clone()) {
                self.items.push(value.clone());
            }
        }
    }
}

/// Complete against `index` with the standard engine.
pub fn complete(index: &CompletionIndex, tokens: &[String], word: &str) -> Vec<String> {
    CompletionEngine::new(index).complete(tokens, word)
}
