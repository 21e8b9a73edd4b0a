//! Lexical rules shared by the tokenizer, the parser, and the CLI argument checks.

/// Longest identifier accepted for principals, variables, and record fields.
pub const MAX_IDENTIFIER_LEN: usize = 255;

/// Longest string literal body (quotes excluded).
pub const MAX_STRING_LEN: usize = 65_535;

pub const RESERVED_WORDS: &[&str] = &[
    "all",
    "append",
    "as",
    "change",
    "create",
    "default",
    "delegate",
    "delegation",
    "delegator",
    "delete",
    "do",
    "exit",
    "foreach",
    "in",
    "local",
    "password",
    "principal",
    "read",
    "replacewith",
    "return",
    "set",
    "to",
    "write",
    "***",
    "split",
    "concat",
    "tolower",
    "notequal",
    "equal",
    "filtereach",
    "with",
    "let",
];

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

/// Characters allowed inside string literals and comments.
pub fn is_string_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | ',' | ';' | '.' | '?' | '!' | '-')
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `[A-Za-z][A-Za-z0-9_]*`, bounded length, not reserved.
pub fn is_valid_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    word.len() <= MAX_IDENTIFIER_LEN && chars.all(is_identifier_char) && !is_reserved(word)
}

/// Validates a string literal body without its surrounding quotes.
pub fn is_valid_string_body(body: &str) -> bool {
    body.len() <= MAX_STRING_LEN && body.chars().all(is_string_char)
}
