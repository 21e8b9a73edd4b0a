use crate::ast::{Command, Expr, FieldValue, Program, Right, Target};
use crate::error::{ParseError, ParseErrorKind};
use crate::lexical::is_valid_identifier;
use crate::token::{Token, tokenize};

/// Parses a complete program, from the `as principal` header through `***`.
///
/// Blank and comment-only lines are skipped; anything after the terminator is ignored.
pub fn parse_program(text: &str) -> Result<Program, ParseError> {
    let mut lines = text.split('\n').enumerate().map(|(idx, line)| (idx + 1, line));

    let (principal, password) = loop {
        let Some((line_no, line)) = lines.next() else {
            return Err(ParseError::new(1, ParseErrorKind::InvalidHeader));
        };
        let tokens = tokenize(line, line_no)?;
        if tokens.is_empty() {
            continue;
        }
        break parse_header(tokens, line_no)?;
    };

    let mut commands = Vec::new();
    let mut last_line = 1;
    for (line_no, line) in lines {
        last_line = line_no;
        let tokens = tokenize(line, line_no)?;
        if tokens == [Token::Stars] {
            return Ok(Program {
                principal,
                password,
                commands,
            });
        }
        if let Some(command) = Parser::new(tokens, line_no).command()? {
            commands.push(command);
        }
    }

    Err(ParseError::new(last_line, ParseErrorKind::MissingTerminator))
}

/// Parses a single command line; `Ok(None)` for blank or comment-only lines.
pub fn parse_command(line: &str, line_no: usize) -> Result<Option<Command>, ParseError> {
    Parser::new(tokenize(line, line_no)?, line_no).command()
}

fn parse_header(tokens: Vec<Token>, line_no: usize) -> Result<(String, String), ParseError> {
    header_fields(&mut Parser::new(tokens, line_no))
        .map_err(|_| ParseError::new(line_no, ParseErrorKind::InvalidHeader))
}

fn header_fields(parser: &mut Parser) -> Result<(String, String), ParseError> {
    parser.keyword("as")?;
    parser.keyword("principal")?;
    let principal = parser.ident()?;
    parser.keyword("password")?;
    let password = parser.string()?;
    parser.keyword("do")?;
    parser.finish()?;
    Ok((principal, password))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    line: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>, line: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            line,
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.line, kind)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_word(&self) -> Option<&str> {
        match self.peek() {
            Some(Token::Word(word)) => Some(word.as_str()),
            _ => None,
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn found(&self) -> String {
        self.peek()
            .map(Token::describe)
            .unwrap_or_else(|| "end of line".into())
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), ParseError> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            return Ok(());
        }
        Err(self.error(ParseErrorKind::Expected {
            expected,
            found: self.found(),
        }))
    }

    fn keyword(&mut self, keyword: &'static str) -> Result<(), ParseError> {
        if self.peek_word() == Some(keyword) {
            self.pos += 1;
            return Ok(());
        }
        Err(self.error(ParseErrorKind::Expected {
            expected: keyword,
            found: self.found(),
        }))
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            Some(Token::Word(word)) if is_valid_identifier(&word) => Ok(word),
            Some(Token::Word(word)) => Err(self.error(ParseErrorKind::InvalidIdentifier(word))),
            other => Err(self.error(ParseErrorKind::Expected {
                expected: "identifier",
                found: other
                    .as_ref()
                    .map(Token::describe)
                    .unwrap_or_else(|| "end of line".into()),
            })),
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            Some(Token::Str(body)) => Ok(body),
            other => Err(self.error(ParseErrorKind::Expected {
                expected: "string literal",
                found: other
                    .as_ref()
                    .map(Token::describe)
                    .unwrap_or_else(|| "end of line".into()),
            })),
        }
    }

    fn finish(&self) -> Result<(), ParseError> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(self.error(ParseErrorKind::TrailingTokens))
        }
    }

    fn command(&mut self) -> Result<Option<Command>, ParseError> {
        let Some(head) = self.peek_word().map(str::to_owned) else {
            if self.tokens.is_empty() {
                return Ok(None);
            }
            return Err(self.error(ParseErrorKind::UnknownCommand));
        };
        self.pos += 1;

        let command = match head.as_str() {
            "exit" => Command::Exit,
            "return" => Command::Return { expr: self.expr()? },
            "create" => {
                self.keyword("principal")?;
                let name = self.ident()?;
                let password = self.string()?;
                Command::CreatePrincipal { name, password }
            }
            "change" => {
                self.keyword("password")?;
                let name = self.ident()?;
                let password = self.string()?;
                Command::ChangePassword { name, password }
            }
            "set" if self.peek_word() == Some("delegation") => {
                self.pos += 1;
                let (target, grantor, right, holder) = self.delegation()?;
                Command::SetDelegation {
                    target,
                    grantor,
                    right,
                    holder,
                }
            }
            "set" => {
                let name = self.ident()?;
                self.expect(Token::Equals, "'='")?;
                Command::Set {
                    name,
                    expr: self.expr()?,
                }
            }
            "append" => {
                self.keyword("to")?;
                let name = self.ident()?;
                self.keyword("with")?;
                Command::AppendTo {
                    name,
                    expr: self.expr()?,
                }
            }
            "local" => {
                let name = self.ident()?;
                self.expect(Token::Equals, "'='")?;
                Command::Local {
                    name,
                    expr: self.expr()?,
                }
            }
            "foreach" => {
                let item = self.ident()?;
                self.keyword("in")?;
                let list = self.ident()?;
                self.keyword("replacewith")?;
                Command::ForEach {
                    item,
                    list,
                    expr: self.expr()?,
                }
            }
            "delete" => {
                self.keyword("delegation")?;
                let (target, grantor, right, holder) = self.delegation()?;
                Command::DeleteDelegation {
                    target,
                    grantor,
                    right,
                    holder,
                }
            }
            "default" => {
                self.keyword("delegator")?;
                self.expect(Token::Equals, "'='")?;
                Command::DefaultDelegator { name: self.ident()? }
            }
            _ => return Err(self.error(ParseErrorKind::UnknownCommand)),
        };

        self.finish()?;
        Ok(Some(command))
    }

    /// `<tgt> q <right> -> p`
    fn delegation(&mut self) -> Result<(Target, String, Right, String), ParseError> {
        let target = if self.peek_word() == Some("all") {
            self.pos += 1;
            Target::All
        } else {
            Target::Variable(self.ident()?)
        };
        let grantor = self.ident()?;
        let right = match self.advance() {
            Some(Token::Word(word)) => word
                .parse::<Right>()
                .map_err(|word| self.error(ParseErrorKind::UnknownRight(word)))?,
            other => {
                return Err(self.error(ParseErrorKind::Expected {
                    expected: "right",
                    found: other
                        .as_ref()
                        .map(Token::describe)
                        .unwrap_or_else(|| "end of line".into()),
                }));
            }
        };
        self.expect(Token::Arrow, "'->'")?;
        let holder = self.ident()?;
        Ok((target, grantor, right, holder))
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Some(Token::LBracket) => {
                self.pos += 1;
                self.expect(Token::RBracket, "']'")?;
                Ok(Expr::EmptyList)
            }
            Some(Token::LBrace) => {
                self.pos += 1;
                self.record()
            }
            Some(Token::Str(_)) => Ok(Expr::Str(self.string()?)),
            _ => {
                let var = self.ident()?;
                if self.peek() == Some(&Token::Dot) {
                    self.pos += 1;
                    let field = self.ident()?;
                    Ok(Expr::Field { var, field })
                } else {
                    Ok(Expr::Var(var))
                }
            }
        }
    }

    fn record(&mut self) -> Result<Expr, ParseError> {
        let mut fields = Vec::new();
        loop {
            let name = self.ident()?;
            self.expect(Token::Equals, "'='")?;
            fields.push((name, self.field_value()?));
            match self.advance() {
                Some(Token::Comma) => continue,
                Some(Token::RBrace) => return Ok(Expr::Record(fields)),
                other => {
                    return Err(self.error(ParseErrorKind::Expected {
                        expected: "',' or '}'",
                        found: other
                            .as_ref()
                            .map(Token::describe)
                            .unwrap_or_else(|| "end of line".into()),
                    }));
                }
            }
        }
    }

    fn field_value(&mut self) -> Result<FieldValue, ParseError> {
        if let Some(Token::Str(_)) = self.peek() {
            return Ok(FieldValue::Str(self.string()?));
        }
        let var = self.ident()?;
        if self.peek() == Some(&Token::Dot) {
            self.pos += 1;
            let field = self.ident()?;
            return Ok(FieldValue::Field { var, field });
        }
        Ok(FieldValue::Var(var))
    }
}
