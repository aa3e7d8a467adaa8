//! Completion index
//!
//! The flattened, prefix-keyed form of a specification. Every prefix that can
//! be reached by subcommand traversal has an entry in every table (possibly
//! empty), so consumers never need to walk the original tree.
//!
//! Tables keyed by slot are nested maps: `prefix → slot-key → value`. A
//! slot-key is `pos_<i>` for positionals or an option invocation string.

mod builder;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::trace;

use crate::spec::Arity;

pub use builder::build;

/// Slot-key of the `i`-th positional.
pub fn positional_slot(i: usize) -> String {
    format!("pos_{i}")
}

/// Immutable, prefix-keyed lookup tables derived from a specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionIndex {
    root: String,
    subcommands: BTreeMap<String, Vec<String>>,
    option_strings: BTreeMap<String, Vec<String>>,
    choices: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    providers: BTreeMap<String, BTreeMap<String, String>>,
    arity: BTreeMap<String, BTreeMap<String, Arity>>,
}

impl CompletionIndex {
    fn new(root: String) -> Self {
        Self {
            root,
            subcommands: BTreeMap::new(),
            option_strings: BTreeMap::new(),
            choices: BTreeMap::new(),
            providers: BTreeMap::new(),
            arity: BTreeMap::new(),
        }
    }

    /// The root prefix (the program name).
    pub fn root(&self) -> &str {
        &self.root
    }

    /// All known prefixes in sorted order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.subcommands.keys().map(String::as_str)
    }

    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.subcommands.contains_key(prefix)
    }

    /// Map an unknown prefix back onto the root.
    pub fn resolve<'a>(&'a self, prefix: &'a str) -> &'a str {
        if self.contains_prefix(prefix) {
            prefix
        } else {
            trace!(prefix, "unknown prefix, falling back to root");
            &self.root
        }
    }

    /// Child subcommand names at `prefix`, in declaration order.
    pub fn subcommands(&self, prefix: &str) -> &[String] {
        self.subcommands
            .get(self.resolve(prefix))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every option invocation string at `prefix`.
    pub fn option_strings(&self, prefix: &str) -> &[String] {
        self.option_strings
            .get(self.resolve(prefix))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn choices(&self, prefix: &str, slot: &str) -> &[String] {
        self.choices
            .get(self.resolve(prefix))
            .and_then(|slots| slots.get(slot))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn provider(&self, prefix: &str, slot: &str) -> Option<&str> {
        self.providers
            .get(self.resolve(prefix))
            .and_then(|slots| slots.get(slot))
            .map(String::as_str)
    }

    pub fn arity(&self, prefix: &str, slot: &str) -> Option<Arity> {
        self.arity
            .get(self.resolve(prefix))
            .and_then(|slots| slots.get(slot))
            .copied()
    }

    pub fn is_subcommand(&self, prefix: &str, word: &str) -> bool {
        self.subcommands(prefix).iter().any(|name| name == word)
    }

    pub fn is_option(&self, prefix: &str, word: &str) -> bool {
        self.option_strings(prefix).iter().any(|flag| flag == word)
    }

    /// Raw subcommand table, for renderers.
    pub fn subcommand_table(&self) -> &BTreeMap<String, Vec<String>> {
        &self.subcommands
    }

    /// Raw option-string table, for renderers.
    pub fn option_table(&self) -> &BTreeMap<String, Vec<String>> {
        &self.option_strings
    }

    /// Raw choices table, for renderers.
    pub fn choice_table(&self) -> &BTreeMap<String, BTreeMap<String, Vec<String>>> {
        &self.choices
    }

    /// Raw provider table, for renderers.
    pub fn provider_table(&self) -> &BTreeMap<String, BTreeMap<String, String>> {
        &self.providers
    }

    /// Raw arity table, for renderers.
    pub fn arity_table(&self) -> &BTreeMap<String, BTreeMap<String, Arity>> {
        &self.arity
    }
}

#[cfg(test)]
mod tests;
