use crate::error::{ParseError, ParseErrorKind};
use crate::lexical::{MAX_STRING_LEN, is_identifier_char, is_string_char};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Keyword or identifier; the parser decides which.
    Word(String),
    /// String literal body without quotes.
    Str(String),
    Equals,
    Comma,
    Dot,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Arrow,
    Stars,
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Token::Word(word) => format!("'{word}'"),
            Token::Str(_) => "string literal".into(),
            Token::Equals => "'='".into(),
            Token::Comma => "','".into(),
            Token::Dot => "'.'".into(),
            Token::LBrace => "'{'".into(),
            Token::RBrace => "'}'".into(),
            Token::LBracket => "'['".into(),
            Token::RBracket => "']'".into(),
            Token::Arrow => "'->'".into(),
            Token::Stars => "'***'".into(),
        }
    }
}

/// Splits one program line into tokens, dropping a trailing `//` comment.
pub fn tokenize(line: &str, line_no: usize) -> Result<Vec<Token>, ParseError> {
    let err = |kind| ParseError::new(line_no, kind);
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            ' ' | '\t' | '\r' => {}
            '/' => {
                if !matches!(chars.peek(), Some((_, '/'))) {
                    return Err(err(ParseErrorKind::UnexpectedChar('/')));
                }
                let body = &line[start + 2..];
                if !body.trim_end_matches('\r').chars().all(is_string_char) {
                    return Err(err(ParseErrorKind::InvalidComment));
                }
                break;
            }
            '"' => {
                let body_start = start + 1;
                let mut body_end = None;
                for (idx, next) in chars.by_ref() {
                    if next == '"' {
                        body_end = Some(idx);
                        break;
                    }
                }
                let body_end = body_end.ok_or_else(|| err(ParseErrorKind::UnterminatedString))?;
                let body = &line[body_start..body_end];
                if body.len() > MAX_STRING_LEN || !body.chars().all(is_string_char) {
                    return Err(err(ParseErrorKind::InvalidString));
                }
                tokens.push(Token::Str(body.to_string()));
            }
            '=' => tokens.push(Token::Equals),
            ',' => tokens.push(Token::Comma),
            '.' => tokens.push(Token::Dot),
            '{' => tokens.push(Token::LBrace),
            '}' => tokens.push(Token::RBrace),
            '[' => tokens.push(Token::LBracket),
            ']' => tokens.push(Token::RBracket),
            '-' => match chars.next() {
                Some((_, '>')) => tokens.push(Token::Arrow),
                _ => return Err(err(ParseErrorKind::UnexpectedChar('-'))),
            },
            '*' => {
                let second = chars.next().map(|(_, c)| c);
                let third = chars.next().map(|(_, c)| c);
                if second != Some('*') || third != Some('*') {
                    return Err(err(ParseErrorKind::UnexpectedChar('*')));
                }
                tokens.push(Token::Stars);
            }
            c if c.is_ascii_alphabetic() => {
                let mut end = start + c.len_utf8();
                while let Some(&(idx, next)) = chars.peek() {
                    if !is_identifier_char(next) {
                        break;
                    }
                    end = idx + next.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Word(line[start..end].to_string()));
            }
            other => return Err(err(ParseErrorKind::UnexpectedChar(other))),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn tokenizes_record_literal() {
        let tokens = tokenize(r#"append to records with {name="mike", date = "1-1-90"}"#, 1).unwrap();
        assert_eq!(
            tokens,
            vec![
                word("append"),
                word("to"),
                word("records"),
                word("with"),
                Token::LBrace,
                word("name"),
                Token::Equals,
                Token::Str("mike".into()),
                Token::Comma,
                word("date"),
                Token::Equals,
                Token::Str("1-1-90".into()),
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn projection_splits_on_dot() {
        let tokens = tokenize("return rec.name", 1).unwrap();
        assert_eq!(tokens, vec![word("return"), word("rec"), Token::Dot, word("name")]);
    }

    #[test]
    fn trailing_comment_is_dropped() {
        let tokens = tokenize("exit // done, bye", 4).unwrap();
        assert_eq!(tokens, vec![word("exit")]);
    }

    #[test]
    fn comment_with_bad_chars_is_rejected() {
        let err = tokenize("exit // nope: colon", 4).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidComment);
        assert_eq!(err.line, 4);
    }

    #[test]
    fn arrow_and_terminator() {
        assert_eq!(
            tokenize("set delegation x admin read -> bob", 1).unwrap().last(),
            Some(&word("bob"))
        );
        assert!(tokenize("read -> bob", 1).unwrap().contains(&Token::Arrow));
        assert_eq!(tokenize("***", 1).unwrap(), vec![Token::Stars]);
        assert!(tokenize("**", 1).is_err());
    }

    #[test]
    fn unterminated_and_invalid_strings() {
        assert_eq!(
            tokenize(r#"set x = "open"#, 2).unwrap_err().kind,
            ParseErrorKind::UnterminatedString
        );
        assert_eq!(
            tokenize(r#"set x = "a/b""#, 2).unwrap_err().kind,
            ParseErrorKind::InvalidString
        );
    }

    #[test]
    fn stray_characters_fail() {
        assert_eq!(
            tokenize("set x = 5", 1).unwrap_err().kind,
            ParseErrorKind::UnexpectedChar('5')
        );
        assert_eq!(
            tokenize("set x = y - z", 1).unwrap_err().kind,
            ParseErrorKind::UnexpectedChar('-')
        );
    }
}
