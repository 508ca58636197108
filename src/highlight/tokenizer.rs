//! Tokenization - per-character highlight class assignment.
//!
//! A [`Tokenizer`] turns source text into one [`HighlightClass`] per
//! character. The built-in [`SimpleTokenizer`] is a keyword-table line
//! scanner; it is deliberately approximate (no block comments, no raw
//! strings) since the engine only consumes the flat class array.

use super::HighlightClass;

/// Tokenization errors.
#[derive(Debug, thiserror::Error)]
pub enum TokenizeError {
    #[error("unsupported language: {0:?}")]
    UnsupportedLanguage(String),
}

/// Per-character classifier contract.
///
/// The returned vector has exactly one entry per `char` of `text`.
pub trait Tokenizer {
    fn classify(&self, text: &str, language: &str)
    -> Result<Vec<HighlightClass>, TokenizeError>;
}

/// Languages understood by [`SimpleTokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Language {
    Python,
    C,
    Cpp,
    CSharp,
    Java,
    Rust,
}

impl Language {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "python" | "py" => Some(Language::Python),
            "c" => Some(Language::C),
            "c++" | "cpp" => Some(Language::Cpp),
            "c#" | "cs" => Some(Language::CSharp),
            "java" => Some(Language::Java),
            "rust" | "rs" => Some(Language::Rust),
            _ => None,
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Language::Python => &[
                "False", "None", "True", "and", "as", "assert", "async", "await", "break",
                "class", "continue", "def", "del", "elif", "else", "except", "finally", "for",
                "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or",
                "pass", "raise", "return", "try", "while", "with", "yield",
            ],
            Language::C => &[
                "auto", "break", "case", "char", "const", "continue", "default", "do", "double",
                "else", "enum", "extern", "float", "for", "goto", "if", "int", "long", "register",
                "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
                "union", "unsigned", "void", "volatile", "while",
            ],
            Language::Cpp => &[
                "auto", "bool", "break", "case", "catch", "char", "class", "const", "constexpr",
                "continue", "default", "delete", "do", "double", "else", "enum", "explicit",
                "extern", "false", "float", "for", "friend", "goto", "if", "inline", "int",
                "long", "namespace", "new", "nullptr", "operator", "private", "protected",
                "public", "return", "short", "signed", "sizeof", "static", "struct", "switch",
                "template", "this", "throw", "true", "try", "typedef", "typename", "union",
                "unsigned", "using", "virtual", "void", "volatile", "while",
            ],
            Language::CSharp => &[
                "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char",
                "class", "const", "continue", "decimal", "default", "delegate", "do", "double",
                "else", "enum", "event", "false", "finally", "float", "for", "foreach", "goto",
                "if", "in", "int", "interface", "internal", "is", "lock", "long", "namespace",
                "new", "null", "object", "out", "override", "private", "protected", "public",
                "readonly", "ref", "return", "sbyte", "sealed", "short", "static", "string",
                "struct", "switch", "this", "throw", "true", "try", "typeof", "uint", "ulong",
                "using", "var", "virtual", "void", "while",
            ],
            Language::Java => &[
                "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char",
                "class", "const", "continue", "default", "do", "double", "else", "enum",
                "extends", "false", "final", "finally", "float", "for", "goto", "if",
                "implements", "import", "instanceof", "int", "interface", "long", "native",
                "new", "null", "package", "private", "protected", "public", "return", "short",
                "static", "strictfp", "super", "switch", "synchronized", "this", "throw",
                "throws", "transient", "true", "try", "void", "volatile", "while",
            ],
            Language::Rust => &[
                "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
                "enum", "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop",
                "match", "mod", "move", "mut", "pub", "ref", "return", "self", "static",
                "struct", "super", "trait", "true", "type", "unsafe", "use", "where", "while",
            ],
        }
    }

    fn builtins(self) -> &'static [&'static str] {
        match self {
            Language::Python => &[
                "abs", "dict", "enumerate", "float", "int", "input", "isinstance", "len",
                "list", "map", "max", "min", "open", "print", "range", "repr", "round", "set",
                "sorted", "str", "sum", "super", "tuple", "type", "zip", "self",
            ],
            Language::C | Language::Cpp => &["printf", "scanf", "malloc", "free", "memcpy"],
            Language::CSharp => &["Console", "Math", "String"],
            Language::Java => &["System", "String", "Math"],
            Language::Rust => &["println", "print", "vec", "format", "Some", "None", "Ok", "Err"],
        }
    }

    fn exceptions(self) -> &'static [&'static str] {
        match self {
            Language::Python => &[
                "BaseException", "Exception", "IndexError", "KeyError", "OSError",
                "RuntimeError", "StopIteration", "TypeError", "ValueError",
            ],
            _ => &[],
        }
    }

    fn line_comment(self) -> &'static str {
        match self {
            Language::Python => "#",
            _ => "//",
        }
    }

    fn class_introducers(self) -> &'static [&'static str] {
        match self {
            Language::Python => &["class"],
            Language::C => &["struct", "union", "enum"],
            Language::Cpp | Language::CSharp | Language::Java => &["class", "struct", "enum"],
            Language::Rust => &["struct", "enum", "trait", "impl", "mod"],
        }
    }
}

/// Keyword-table line scanner.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTokenizer;

impl Tokenizer for SimpleTokenizer {
    fn classify(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Vec<HighlightClass>, TokenizeError> {
        let lang = Language::from_tag(language)
            .ok_or_else(|| TokenizeError::UnsupportedLanguage(language.to_string()))?;

        let chars: Vec<char> = text.chars().collect();
        let mut classes = vec![HighlightClass::Other; chars.len()];
        scan(lang, &chars, &mut classes);
        assign_bracket_levels(&chars, &mut classes);
        Ok(classes)
    }
}

fn scan(lang: Language, chars: &[char], classes: &mut [HighlightClass]) {
    let comment = lang.line_comment();
    let mut i = 0;
    // Last identifier on the current line, used for class-name detection.
    let mut prev_word: Option<String> = None;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            prev_word = None;
            i += 1;
            continue;
        }

        if starts_with(chars, i, comment) {
            while i < chars.len() && chars[i] != '\n' {
                classes[i] = HighlightClass::Comment;
                i += 1;
            }
            continue;
        }

        if c == '"' || c == '\'' {
            classes[i] = HighlightClass::Str;
            let quote = c;
            i += 1;
            while i < chars.len() && chars[i] != '\n' {
                classes[i] = HighlightClass::Str;
                if chars[i] == '\\' && i + 1 < chars.len() && chars[i + 1] != '\n' {
                    classes[i + 1] = HighlightClass::Str;
                    i += 2;
                    continue;
                }
                if chars[i] == quote {
                    i += 1;
                    break;
                }
                i += 1;
            }
            continue;
        }

        if c.is_ascii_digit() {
            while i < chars.len()
                && (chars[i].is_ascii_alphanumeric() || chars[i] == '.' || chars[i] == '_')
            {
                classes[i] = HighlightClass::Number;
                i += 1;
            }
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let class = classify_word(lang, &word, prev_word.as_deref(), chars, start, i);
            for slot in &mut classes[start..i] {
                *slot = class;
            }
            prev_word = Some(word);
            continue;
        }

        classes[i] = if "+-*/%=<>!&|^~?".contains(c) {
            HighlightClass::Operator
        } else if "()[]{}.,:;@#$\\".contains(c) {
            HighlightClass::Punctuation
        } else {
            HighlightClass::Other
        };
        i += 1;
    }
}

fn classify_word(
    lang: Language,
    word: &str,
    prev_word: Option<&str>,
    chars: &[char],
    start: usize,
    end: usize,
) -> HighlightClass {
    if lang.keywords().contains(&word) {
        return HighlightClass::Keyword;
    }
    if lang.exceptions().contains(&word) {
        return HighlightClass::Exception;
    }
    if lang.builtins().contains(&word) {
        return HighlightClass::Builtin;
    }
    if let Some(prev) = prev_word {
        if lang.class_introducers().contains(&prev) {
            return HighlightClass::Class;
        }
    }
    if start > 0 && chars[start - 1] == '.' {
        return HighlightClass::Attribute;
    }
    // Call-shaped identifier.
    let mut j = end;
    while j < chars.len() && (chars[j] == ' ' || chars[j] == '\t') {
        j += 1;
    }
    if j < chars.len() && chars[j] == '(' {
        return HighlightClass::Function;
    }
    HighlightClass::Variable
}

fn starts_with(chars: &[char], at: usize, needle: &str) -> bool {
    let mut i = at;
    for nc in needle.chars() {
        if chars.get(i) != Some(&nc) {
            return false;
        }
        i += 1;
    }
    true
}

fn closes(open: char, close: char) -> bool {
    matches!((open, close), ('(', ')') | ('[', ']') | ('{', '}'))
}

/// Assign bracket depth levels (modulo 5) over bracket punctuation.
///
/// A running signed counter tracks nesting: the innermost open bracket is
/// "armed" and its matching close reuses the same level; a close that does
/// not match (or arrives unarmed) decrements the counter instead. The
/// counter is purely positional and never errors on unbalanced input -
/// `"(]"` yields levels 0 and 4 (the counter passes through -1).
pub fn assign_bracket_levels(chars: &[char], classes: &mut [HighlightClass]) {
    let mut depth: i64 = 0;
    let mut armed: Option<char> = None;

    for (i, &c) in chars.iter().enumerate() {
        if classes[i] != HighlightClass::Punctuation {
            continue;
        }
        if "([{".contains(c) {
            match armed {
                None => armed = Some(c),
                Some(_) => {
                    depth += 1;
                    armed = Some(c);
                }
            }
            classes[i] = HighlightClass::Bracket(depth.rem_euclid(5) as u8);
        } else if ")]}".contains(c) {
            match armed.take() {
                Some(open) if closes(open, c) => {}
                _ => depth -= 1,
            }
            classes[i] = HighlightClass::Bracket(depth.rem_euclid(5) as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use HighlightClass as H;

    fn levels(text: &str) -> Vec<(char, u8)> {
        let chars: Vec<char> = text.chars().collect();
        let mut classes = vec![H::Punctuation; chars.len()];
        for (i, c) in chars.iter().enumerate() {
            if !"()[]{}".contains(*c) {
                classes[i] = H::Other;
            }
        }
        assign_bracket_levels(&chars, &mut classes);
        chars
            .iter()
            .zip(classes.iter())
            .filter_map(|(&c, &cl)| match cl {
                H::Bracket(l) => Some((c, l)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_bracket_levels_nested() {
        assert_eq!(
            levels("(())"),
            vec![('(', 0), ('(', 1), (')', 1), (')', 0)]
        );
    }

    #[test]
    fn test_bracket_levels_siblings() {
        assert_eq!(
            levels("()()"),
            vec![('(', 0), (')', 0), ('(', 0), (')', 0)]
        );
    }

    #[test]
    fn test_bracket_levels_unbalanced_wraps() {
        // Mismatched close decrements through -1, which wraps to level 4.
        assert_eq!(levels("(]"), vec![('(', 0), (']', 4)]);
    }

    #[test]
    fn test_bracket_levels_deep_cycle() {
        let got = levels("([{([({");
        let opens: Vec<u8> = got.iter().map(|&(_, l)| l).collect();
        assert_eq!(opens, vec![0, 1, 2, 3, 4, 0, 1]);
    }

    #[test]
    fn test_bracket_levels_ignore_non_punctuation() {
        // Brackets inside content already classified as strings stay put.
        let chars: Vec<char> = "\"(\"".chars().collect();
        let mut classes = vec![H::Str; 3];
        assign_bracket_levels(&chars, &mut classes);
        assert_eq!(classes, vec![H::Str; 3]);
    }

    #[test]
    fn test_classify_python_keywords() {
        let text = "def f():\n\treturn 1\n";
        let classes = SimpleTokenizer.classify(text, "py").unwrap();
        assert_eq!(classes.len(), text.chars().count());
        // "def"
        assert_eq!(classes[0], H::Keyword);
        assert_eq!(classes[2], H::Keyword);
        // "f" is call-shaped
        assert_eq!(classes[4], H::Function);
        // "1"
        let one = text.chars().position(|c| c == '1').unwrap();
        assert_eq!(classes[one], H::Number);
    }

    #[test]
    fn test_classify_comment_and_string() {
        let text = "x = \"hi\" # done\n";
        let classes = SimpleTokenizer.classify(text, "python").unwrap();
        let chars: Vec<char> = text.chars().collect();
        let quote = chars.iter().position(|&c| c == '"').unwrap();
        assert_eq!(classes[quote], H::Str);
        assert_eq!(classes[quote + 1], H::Str);
        let hash = chars.iter().position(|&c| c == '#').unwrap();
        assert!(classes[hash..text.chars().count() - 1]
            .iter()
            .all(|&c| c == H::Comment));
    }

    #[test]
    fn test_unsupported_language() {
        let err = SimpleTokenizer.classify("x", "cobol").unwrap_err();
        assert!(matches!(err, TokenizeError::UnsupportedLanguage(_)));
    }

    #[test]
    fn test_class_name_after_introducer() {
        let classes = SimpleTokenizer.classify("class Foo:", "py").unwrap();
        assert_eq!(classes[6], H::Class);
    }
}
