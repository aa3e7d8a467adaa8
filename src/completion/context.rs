//! Completion context definitions
//!
//! A context is the outcome of the token walk: the node the cursor sits in,
//! what kind of word is being completed, and the word itself.

/// What kind of completion the word under the cursor needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// Complete option invocation strings of a node
    Options {
        /// Prefix of the node
        node: String,
        /// Word being completed
        word: String,
    },

    /// Complete the value of a slot
    Slot {
        /// Prefix of the node
        node: String,
        /// Slot-key the word belongs to
        slot: String,
        /// Whether subcommand names are still valid here
        subcommands: bool,
        /// Word being completed
        word: String,
    },
}

impl CompletionContext {
    /// Create an option completion context
    pub fn options(node: impl Into<String>, word: impl Into<String>) -> Self {
        Self::Options {
            node: node.into(),
            word: word.into(),
        }
    }

    /// Create a slot completion context
    pub fn slot(
        node: impl Into<String>,
        slot: impl Into<String>,
        subcommands: bool,
        word: impl Into<String>,
    ) -> Self {
        Self::Slot {
            node: node.into(),
            slot: slot.into(),
            subcommands,
            word: word.into(),
        }
    }

    /// Prefix of the node the cursor is in
    pub fn node(&self) -> &str {
        match self {
            Self::Options { node, .. } | Self::Slot { node, .. } => node,
        }
    }

    /// The word being completed
    pub fn word(&self) -> &str {
        match self {
            Self::Options { word, .. } | Self::Slot { word, .. } => word,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let ctx = CompletionContext::options("prog", "--v");
        assert_eq!(ctx.node(), "prog");
        assert_eq!(ctx.word(), "--v");

        let ctx = CompletionContext::slot("prog_build", "pos_0", true, "re");
        assert_eq!(ctx.node(), "prog_build");
        assert_eq!(ctx.word(), "re");
        assert!(matches!(ctx, CompletionContext::Slot { subcommands: true, .. }));
    }
}
