//! Token stream with cursor awareness for completion
//!
//! Splits a command line into the fully typed words before the cursor and the
//! partial word under it. The program name is not part of the stream.

/// Typed words plus the word being completed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    /// Fully typed words after the program name
    tokens: Vec<String>,
    /// Partial word under the cursor (empty after whitespace)
    current: String,
}

impl TokenStream {
    pub fn new(tokens: Vec<String>, current: impl Into<String>) -> Self {
        Self {
            tokens,
            current: current.into(),
        }
    }

    /// Build from argument words that exclude the program name; the last word
    /// is the one being completed.
    pub fn from_words(words: &[String]) -> Self {
        match words.split_last() {
            Some((current, typed)) => Self::new(typed.to_vec(), current.clone()),
            None => Self::default(),
        }
    }

    /// Build from a whole command line with the cursor at byte `cursor`.
    ///
    /// Words are split with shell quoting rules; an unbalanced quote falls
    /// back to whitespace splitting. Text after the cursor is ignored.
    pub fn from_line(line: &str, cursor: usize) -> Self {
        let mut end = cursor.min(line.len());
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        let line = &line[..end];

        let mut words = shlex::split(line)
            .unwrap_or_else(|| line.split_whitespace().map(str::to_string).collect());
        if words.is_empty() {
            return Self::default();
        }
        words.remove(0);

        let current = if line.ends_with(char::is_whitespace) {
            String::new()
        } else {
            words.pop().unwrap_or_default()
        };
        Self::new(words, current)
    }

    /// Words fully typed before the cursor
    pub fn tokens_before_cursor(&self) -> &[String] {
        &self.tokens
    }

    /// The partial word being completed
    pub fn current_prefix(&self) -> &str {
        &self.current
    }
}
