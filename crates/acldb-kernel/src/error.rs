use acldb_lang::Right;
use thiserror::Error;

/// How a failed command affects the program outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Reported as `FAILED`.
    Failure,
    /// Reported as `DENIED`.
    SecurityViolation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("parse error: {0}")]
    Parse(#[from] acldb_lang::ParseError),
    #[error("unknown principal '{0}'")]
    UnknownPrincipal(String),
    #[error("authentication failed for '{0}'")]
    AuthenticationFailed(String),
    #[error("principal '{0}' already exists")]
    PrincipalExists(String),
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),
    #[error("variable '{0}' already exists")]
    VariableExists(String),
    #[error("variable '{0}' is local")]
    LocalVariable(String),
    #[error("variable '{name}' is a {found}, expected a {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("record '{var}' has no field '{field}'")]
    MissingField { var: String, field: String },
    #[error("duplicate record field '{0}'")]
    DuplicateField(String),
    #[error("record field '{0}' must hold a string")]
    NonStringField(String),
    #[error("foreach replacement must not be a list")]
    ListReplacement,
    #[error("'{principal}' lacks {right} on '{variable}'")]
    PermissionDenied {
        principal: String,
        variable: String,
        right: Right,
    },
    #[error("'{actor}' may not {action}")]
    NotAuthorized { actor: String, action: &'static str },
}

impl ExecError {
    pub fn severity(&self) -> Severity {
        match self {
            ExecError::AuthenticationFailed(_)
            | ExecError::PermissionDenied { .. }
            | ExecError::NotAuthorized { .. } => Severity::SecurityViolation,
            _ => Severity::Failure,
        }
    }

    pub(crate) fn denied(principal: &str, variable: &str, right: Right) -> Self {
        ExecError::PermissionDenied {
            principal: principal.to_string(),
            variable: variable.to_string(),
            right,
        }
    }

    pub(crate) fn not_authorized(actor: &str, action: &'static str) -> Self {
        ExecError::NotAuthorized {
            actor: actor.to_string(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_errors_are_violations() {
        assert_eq!(
            ExecError::denied("bob", "x", Right::Read).severity(),
            Severity::SecurityViolation
        );
        assert_eq!(
            ExecError::not_authorized("bob", "exit").severity(),
            Severity::SecurityViolation
        );
        assert_eq!(
            ExecError::AuthenticationFailed("bob".into()).severity(),
            Severity::SecurityViolation
        );
    }

    #[test]
    fn structural_errors_are_failures() {
        assert_eq!(
            ExecError::UndefinedVariable("x".into()).severity(),
            Severity::Failure
        );
        assert_eq!(
            ExecError::UnknownPrincipal("ghost".into()).severity(),
            Severity::Failure
        );
        assert_eq!(ExecError::ListReplacement.severity(), Severity::Failure);
    }
}
