//! Completion engine
//!
//! The in-process form of the completion algorithm that every emitted shell
//! script implements. Given a built [`CompletionIndex`](crate::index::CompletionIndex)
//! and the words typed so far, it decides what is being completed (a
//! subcommand, an option, or a slot value) and produces the candidate set.
//!
//! # Architecture
//!
//! - **TokenStream**: splits a command line into typed words and the word under the cursor
//! - **Description**: the shell-agnostic rule order shared with the renderers
//! - **FSM**: walks the typed words and tracks node, positional count and active slot
//! - **Context**: what the word under the cursor should be completed as
//! - **Provider**: named dynamic candidate sources (files, directories, ...)
//! - **Engine**: orchestrates the flow, filters and deduplicates
//!
//! # Examples
//!
//! ```
//! use tabgen::completion::CompletionEngine;
//! use tabgen::index::build;
//! use tabgen::spec::Spec;
//!
//! let mut spec = Spec::new("prog");
//! let root = spec.root();
//! spec.add_subcommand(root, "build");
//! spec.add_subcommand(root, "test");
//! let index = build(&spec).unwrap();
//!
//! let engine = CompletionEngine::new(&index);
//! assert_eq!(engine.complete(&[], "bu"), vec!["build"]);
//! ```

mod context;
mod description;
mod engine;
mod fsm;
mod provider;
mod token_stream;

pub use context::CompletionContext;
pub use description::{CandidateSource, EngineDescription, MatchCase, WalkRule};
pub use engine::{CompletionEngine, complete};
pub use fsm::{ActiveSlot, SlotKind, WalkState};
pub use provider::{
    CandidateProvider, DIRECTORY_COMPLETER, FILE_COMPLETER, FileProvider, ProviderRegistry,
    StaticProvider,
};
pub use token_stream::TokenStream;
