//! Passage content rules.
//!
//! The checks here are coarse heuristics (word count and length), not a
//! judgement of quality. They gate commits: a pending passage is re-checked
//! on every verification vote.

/// Fewest whitespace-delimited words a passage may have.
pub const MIN_WORDS: usize = 250;
/// Most whitespace-delimited words a passage may have.
pub const MAX_WORDS: usize = 500;
/// Fewest characters a passage may have after trimming.
pub const MIN_TRIMMED_CHARS: usize = 100;

/// Why a passage was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("passage too short: minimum {min} words required, got {words}")]
    TooShort { words: usize, min: usize },

    #[error("passage too long: maximum {max} words allowed, got {words}")]
    TooLong { words: usize, max: usize },

    #[error("passage cannot be empty")]
    Empty,

    #[error("passage appears to contain insufficient content ({chars} characters, minimum {min})")]
    InsufficientContent { chars: usize, min: usize },
}

/// Bounds applied by [`ContentRules::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRules {
    pub min_words: usize,
    pub max_words: usize,
    pub min_trimmed_chars: usize,
}

impl Default for ContentRules {
    fn default() -> Self {
        Self {
            min_words: MIN_WORDS,
            max_words: MAX_WORDS,
            min_trimmed_chars: MIN_TRIMMED_CHARS,
        }
    }
}

impl ContentRules {
    /// Check a passage against these bounds.
    ///
    /// Checks run in a fixed order: word count (low, then high), emptiness,
    /// then trimmed length. The first failing check is reported.
    pub fn validate(&self, content: &str) -> Result<(), ContentError> {
        let words = word_count(content);
        if words < self.min_words {
            return Err(ContentError::TooShort {
                words,
                min: self.min_words,
            });
        }
        if words > self.max_words {
            return Err(ContentError::TooLong {
                words,
                max: self.max_words,
            });
        }

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ContentError::Empty);
        }

        let chars = trimmed.chars().count();
        if chars < self.min_trimmed_chars {
            return Err(ContentError::InsufficientContent {
                chars,
                min: self.min_trimmed_chars,
            });
        }

        Ok(())
    }
}

/// Validate a passage against the standard bounds.
pub fn validate_content(content: &str) -> Result<(), ContentError> {
    ContentRules::default().validate(content)
}

/// Number of whitespace-delimited tokens in `content`.
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}
