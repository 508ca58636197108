//! Simplified highlight classes.
//!
//! Tokenizers map language-specific token kinds onto this closed set; the
//! segmenter and renderer never see anything finer-grained.

/// Per-character syntax class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightClass {
    /// Language keyword.
    Keyword,
    /// String literal (any quoting style).
    Str,
    /// Numeric literal.
    Number,
    /// Comment.
    Comment,
    /// Operator character.
    Operator,
    /// Punctuation other than brackets.
    Punctuation,
    /// Bracket colored by nesting depth modulo 5 (level 0..=4).
    Bracket(u8),
    /// Type or class name.
    Class,
    /// Function name.
    Function,
    /// Plain identifier.
    Variable,
    /// Attribute or property access.
    Attribute,
    /// Built-in name.
    Builtin,
    /// Exception name.
    Exception,
    /// Anything else (whitespace, unknown).
    Other,
}

impl HighlightClass {
    /// Whether this class is a bracket at any depth.
    #[inline]
    pub fn is_bracket(self) -> bool {
        matches!(self, HighlightClass::Bracket(_))
    }
}
