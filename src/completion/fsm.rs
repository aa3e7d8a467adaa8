//! Token walk state machine
//!
//! Walks the fully typed words of a command line against a completion index
//! and works out which node and which slot the word under the cursor belongs
//! to. The walk is:
//! - Single pass, O(n) in the number of typed words
//! - Total: unknown words and prefixes degrade, they never fail
//! - Ordered by the [`EngineDescription`]: the first rule that claims a token wins

use tracing::trace;

use super::context::CompletionContext;
use super::description::{EngineDescription, WalkRule};
use crate::index::{CompletionIndex, positional_slot};
use crate::spec::Arity;

/// What kind of slot is absorbing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Option,
    Positional,
}

/// The slot currently absorbing arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSlot {
    /// Slot-key: an option invocation string or `pos_<i>`.
    pub key: String,
    pub kind: SlotKind,
    pub arity: Arity,
    /// Tokens absorbed so far (a positional counts its opening token).
    pub consumed: usize,
}

impl ActiveSlot {
    /// Tokens the slot still needs before anything else may be parsed.
    pub fn required_remaining(&self) -> usize {
        match self.arity {
            Arity::Exactly(n) => n.saturating_sub(self.consumed),
            Arity::OneOrMore if self.consumed == 0 => 1,
            _ => 0,
        }
    }

    /// Whether the slot takes `token`.
    ///
    /// Bounded slots take exactly what they still need. A zero-or-one slot
    /// takes the next word unless it looks like an option. Unbounded slots
    /// take every word, the separator and option strings included.
    pub fn absorbs(&self, desc: &EngineDescription, token: &str) -> bool {
        match self.arity {
            Arity::Exactly(n) => self.consumed < n,
            Arity::Optional => self.consumed == 0 && !desc.looks_like_option(token),
            Arity::ZeroOrMore | Arity::OneOrMore | Arity::Remainder => true,
        }
    }

    /// Bounded slots close once they have everything they can take.
    pub fn is_exhausted(&self) -> bool {
        match self.arity {
            Arity::Exactly(n) => self.consumed >= n,
            Arity::Optional => self.consumed >= 1,
            Arity::ZeroOrMore | Arity::OneOrMore | Arity::Remainder => false,
        }
    }
}

/// State carried across the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkState {
    /// Prefix of the current node.
    pub prefix: String,
    /// Positional slots consumed at the current node.
    pub positional_count: usize,
    pub active: Option<ActiveSlot>,
    /// Set for good by a bare separator outside slot absorption.
    pub positional_only: bool,
}

impl WalkState {
    /// Initial state: at the root, nothing consumed.
    pub fn new(index: &CompletionIndex) -> Self {
        Self {
            prefix: index.root().to_string(),
            positional_count: 0,
            active: None,
            positional_only: false,
        }
    }

    /// Run the walk over every typed token.
    pub fn run(index: &CompletionIndex, desc: &EngineDescription, tokens: &[String]) -> Self {
        let mut state = Self::new(index);
        for token in tokens {
            state.next(index, desc, token);
        }
        state
    }

    /// Feed one token through the walk rules.
    pub fn next(&mut self, index: &CompletionIndex, desc: &EngineDescription, token: &str) {
        if !index.contains_prefix(&self.prefix) {
            self.prefix = index.root().to_string();
        }

        for rule in &desc.walk {
            if self.apply(*rule, index, desc, token) {
                trace!(?rule, token, state = ?self, "token claimed");
                return;
            }
        }
    }

    /// Slot-key the word under the cursor is completed against.
    pub fn current_slot(&self) -> String {
        match &self.active {
            Some(slot) => slot.key.clone(),
            None => positional_slot(self.positional_count),
        }
    }

    fn apply(
        &mut self,
        rule: WalkRule,
        index: &CompletionIndex,
        desc: &EngineDescription,
        token: &str,
    ) -> bool {
        match rule {
            WalkRule::Absorb => {
                let absorbs = match &self.active {
                    Some(slot) => slot.absorbs(desc, token),
                    None => return false,
                };
                if !absorbs {
                    self.release();
                    return false;
                }
                if let Some(slot) = self.active.as_mut() {
                    slot.consumed += 1;
                }
                if self.active.as_ref().is_some_and(ActiveSlot::is_exhausted) {
                    self.release();
                }
                true
            }
            WalkRule::Separator => {
                if self.positional_only || token != desc.separator {
                    return false;
                }
                self.positional_only = true;
                true
            }
            WalkRule::Subcommand => {
                if self.positional_only || !index.is_subcommand(&self.prefix, token) {
                    return false;
                }
                self.prefix = format!("{}_{token}", self.prefix);
                self.positional_count = 0;
                self.active = None;
                true
            }
            WalkRule::OptionString => {
                if self.positional_only || !index.is_option(&self.prefix, token) {
                    return false;
                }
                let arity = index
                    .arity(&self.prefix, token)
                    .unwrap_or(Arity::Exactly(0));
                self.active = (arity != Arity::Exactly(0)).then(|| ActiveSlot {
                    key: token.to_string(),
                    kind: SlotKind::Option,
                    arity,
                    consumed: 0,
                });
                true
            }
            WalkRule::Positional => {
                let key = positional_slot(self.positional_count);
                let arity = index.arity(&self.prefix, &key).unwrap_or(Arity::Exactly(1));
                let slot = ActiveSlot {
                    key,
                    kind: SlotKind::Positional,
                    arity,
                    consumed: 1,
                };
                if slot.is_exhausted() {
                    self.positional_count += 1;
                    self.active = None;
                } else {
                    self.active = Some(slot);
                }
                true
            }
        }
    }

    /// Close the active slot; a closed positional slot counts as consumed.
    fn release(&mut self) {
        if let Some(slot) = self.active.take() {
            if slot.kind == SlotKind::Positional {
                self.positional_count += 1;
            }
        }
    }

    /// Decide what the word under the cursor should be completed as.
    pub fn to_context(
        &self,
        index: &CompletionIndex,
        desc: &EngineDescription,
        word: &str,
    ) -> CompletionContext {
        let node = index.resolve(&self.prefix).to_string();
        let option_pending = self
            .active
            .as_ref()
            .is_some_and(|slot| slot.kind == SlotKind::Option && slot.required_remaining() > 0);

        if !self.positional_only && !option_pending && desc.looks_like_option(word) {
            return CompletionContext::options(node, word);
        }

        CompletionContext::slot(
            node,
            self.current_slot(),
            self.positional_count == 0 && self.active.is_none() && !self.positional_only,
            word,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build;
    use crate::spec::{OptionDecl, PositionalDecl, Spec};

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn index() -> CompletionIndex {
        let mut spec = Spec::new("prog");
        let root = spec.root();
        spec.add_option(root, OptionDecl::flag(["-v", "--verbose"]))
            .add_option(root, OptionDecl::with_value(["-o"]).arity(Arity::Exactly(2)))
            .add_option(root, OptionDecl::with_value(["--color"]).arity(Arity::Optional))
            .add_option(root, OptionDecl::with_value(["--tag"]).arity(Arity::OneOrMore))
            .add_positional(root, PositionalDecl::new("first"))
            .add_positional(root, PositionalDecl::new("pair").arity(Arity::Exactly(2)))
            .add_positional(root, PositionalDecl::new("rest").arity(Arity::ZeroOrMore));
        let build_id = spec.add_subcommand(root, "build");
        spec.add_positional(build_id, PositionalDecl::new("cmd").arity(Arity::Remainder));
        build(&spec).unwrap()
    }

    fn run(tokens: &[&str]) -> WalkState {
        WalkState::run(&index(), &EngineDescription::standard(), &words(tokens))
    }

    #[test]
    fn test_initial_state() {
        let state = run(&[]);
        assert_eq!(state.prefix, "prog");
        assert_eq!(state.positional_count, 0);
        assert!(state.active.is_none());
        assert!(!state.positional_only);
    }

    #[test]
    fn test_subcommand_descends() {
        let state = run(&["build"]);
        assert_eq!(state.prefix, "prog_build");
        assert_eq!(state.positional_count, 0);
    }

    #[test]
    fn test_zero_arity_option_clears_immediately() {
        let state = run(&["--verbose"]);
        assert!(state.active.is_none());
        assert_eq!(state.current_slot(), "pos_0");
    }

    #[test]
    fn test_bounded_option_absorbs_exactly() {
        let state = run(&["-o", "build"]);
        let slot = state.active.as_ref().unwrap();
        assert_eq!(slot.key, "-o");
        assert_eq!(slot.required_remaining(), 1);
        assert_eq!(state.prefix, "prog");

        let state = run(&["-o", "build", "--"]);
        assert!(state.active.is_none());
        assert!(!state.positional_only);
    }

    #[test]
    fn test_multi_token_positional_advances_when_full() {
        let state = run(&["a", "b"]);
        assert_eq!(state.positional_count, 1);
        assert_eq!(state.current_slot(), "pos_1");

        let state = run(&["a", "b", "c"]);
        assert_eq!(state.positional_count, 2);
        assert!(state.active.is_none());
    }

    #[test]
    fn test_optional_option_is_one_shot() {
        let state = run(&["--color"]);
        assert_eq!(state.current_slot(), "--color");

        let state = run(&["--color", "always"]);
        assert!(state.active.is_none());
        assert_eq!(state.positional_count, 0);

        let state = run(&["--color", "-v"]);
        assert!(state.active.is_none());
        assert_eq!(state.current_slot(), "pos_0");
    }

    #[test]
    fn test_one_or_more_option_keeps_absorbing() {
        let state = run(&["--tag", "-v"]);
        let slot = state.active.as_ref().unwrap();
        assert_eq!(slot.key, "--tag");
        assert_eq!(slot.consumed, 1);

        let state = run(&["--tag", "x", "-v", "--"]);
        let slot = state.active.as_ref().unwrap();
        assert_eq!(slot.key, "--tag");
        assert_eq!(slot.consumed, 3);
        assert!(!state.positional_only);
    }

    #[test]
    fn test_open_slot_absorbs_separator_and_options() {
        let state = run(&["a", "b", "c", "d", "--"]);
        assert!(!state.positional_only);
        assert_eq!(state.positional_count, 2);
        assert_eq!(state.current_slot(), "pos_2");
        assert_eq!(state.active.as_ref().unwrap().consumed, 2);

        let state = run(&["a", "b", "c", "d", "-v", "build"]);
        assert_eq!(state.prefix, "prog");
        assert_eq!(state.current_slot(), "pos_2");
        assert_eq!(state.active.as_ref().unwrap().consumed, 3);
    }

    #[test]
    fn test_remainder_takes_everything() {
        let state = run(&["build", "make", "--", "-v"]);
        assert_eq!(state.prefix, "prog_build");
        assert!(!state.positional_only);
        let slot = state.active.as_ref().unwrap();
        assert_eq!(slot.key, "pos_0");
        assert_eq!(slot.consumed, 3);
    }

    #[test]
    fn test_separator_makes_everything_positional() {
        let state = run(&["--", "build", "-v"]);
        assert_eq!(state.prefix, "prog");
        assert!(state.positional_only);
        assert_eq!(state.positional_count, 1);
        assert_eq!(state.active.as_ref().unwrap().key, "pos_1");
    }

    #[test]
    fn test_options_context_unless_option_pending() {
        let idx = index();
        let desc = EngineDescription::standard();

        let state = WalkState::run(&idx, &desc, &words(&[]));
        assert!(matches!(
            state.to_context(&idx, &desc, "-"),
            CompletionContext::Options { .. }
        ));

        let state = WalkState::run(&idx, &desc, &words(&["-o"]));
        assert!(matches!(
            state.to_context(&idx, &desc, "-"),
            CompletionContext::Slot { .. }
        ));
    }

    #[test]
    fn test_no_subcommands_after_separator() {
        let idx = index();
        let desc = EngineDescription::standard();

        let state = WalkState::run(&idx, &desc, &words(&[]));
        assert!(matches!(
            state.to_context(&idx, &desc, ""),
            CompletionContext::Slot { subcommands: true, .. }
        ));

        let state = WalkState::run(&idx, &desc, &words(&["--"]));
        assert!(matches!(
            state.to_context(&idx, &desc, ""),
            CompletionContext::Slot { subcommands: false, .. }
        ));
    }
}
