use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A parsed program: the authenticating principal plus its commands in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub principal: String,
    pub password: String,
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Right {
    Read,
    Write,
    Append,
    Delegate,
}

impl Right {
    pub const ALL: [Right; 4] = [Right::Read, Right::Write, Right::Append, Right::Delegate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Right::Read => "read",
            Right::Write => "write",
            Right::Append => "append",
            Right::Delegate => "delegate",
        }
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Right {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Right::Read),
            "write" => Ok(Right::Write),
            "append" => Ok(Right::Append),
            "delegate" => Ok(Right::Delegate),
            other => Err(other.to_string()),
        }
    }
}

/// Delegation target: one variable, or every variable the grantor may delegate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    All,
    Variable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    CreatePrincipal {
        name: String,
        password: String,
    },
    ChangePassword {
        name: String,
        password: String,
    },
    Set {
        name: String,
        expr: Expr,
    },
    AppendTo {
        name: String,
        expr: Expr,
    },
    Local {
        name: String,
        expr: Expr,
    },
    ForEach {
        item: String,
        list: String,
        expr: Expr,
    },
    SetDelegation {
        target: Target,
        grantor: String,
        right: Right,
        holder: String,
    },
    DeleteDelegation {
        target: Target,
        grantor: String,
        right: Right,
        holder: String,
    },
    DefaultDelegator {
        name: String,
    },
    Exit,
    Return {
        expr: Expr,
    },
}

impl Command {
    /// Short name used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Command::CreatePrincipal { .. } => "create principal",
            Command::ChangePassword { .. } => "change password",
            Command::Set { .. } => "set",
            Command::AppendTo { .. } => "append to",
            Command::Local { .. } => "local",
            Command::ForEach { .. } => "foreach",
            Command::SetDelegation { .. } => "set delegation",
            Command::DeleteDelegation { .. } => "delete delegation",
            Command::DefaultDelegator { .. } => "default delegator",
            Command::Exit => "exit",
            Command::Return { .. } => "return",
        }
    }

    /// `exit` and `return` end the program after they run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Command::Exit | Command::Return { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    EmptyList,
    Str(String),
    Var(String),
    Field { var: String, field: String },
    Record(Vec<(String, FieldValue)>),
}

/// Right-hand side of a `name = value` pair inside a record literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Str(String),
    Var(String),
    Field { var: String, field: String },
}
