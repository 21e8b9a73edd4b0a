//! Surface syntax of the acldb policy language: tokens, syntax tree, and the
//! recursive-descent parser that turns program text into [`Program`]s.

mod ast;
mod error;
pub mod lexical;
mod parser;
mod token;

pub use ast::{Command, Expr, FieldValue, Program, Right, Target};
pub use error::{ParseError, ParseErrorKind};
pub use parser::{parse_command, parse_program};
pub use token::{Token, tokenize};
