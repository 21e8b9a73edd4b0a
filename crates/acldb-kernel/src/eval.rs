//! Expression evaluation against a snapshot, on behalf of one principal.

use acldb_lang::{Expr, FieldValue, Right};

use crate::error::ExecError;
use crate::principal::ADMIN;
use crate::store::{Snapshot, Variable};
use crate::value::{Record, Value};

pub type EvalResult<T = Value> = Result<T, ExecError>;

/// The current element of a `foreach`. Not a store variable; never permission-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopBinding {
    pub name: String,
    pub value: Value,
}

impl LoopBinding {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

pub struct Evaluator<'a> {
    snapshot: &'a Snapshot,
    actor: &'a str,
    binding: Option<&'a LoopBinding>,
}

impl<'a> Evaluator<'a> {
    pub fn new(snapshot: &'a Snapshot, actor: &'a str) -> Self {
        Self {
            snapshot,
            actor,
            binding: None,
        }
    }

    pub fn with_binding(mut self, binding: &'a LoopBinding) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Evaluates `expr` to an owned value.
    pub fn eval(&self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::EmptyList => Ok(Value::List(Vec::new())),
            Expr::Str(text) => Ok(Value::String(text.clone())),
            Expr::Var(name) => match self.bound(name) {
                Some(binding) => Ok(binding.value.clone()),
                None => Ok(self.readable(name)?.value.clone()),
            },
            Expr::Field { var, field } => self.field(var, field).map(Value::String),
            Expr::Record(fields) => self.record(fields).map(Value::Record),
        }
    }

    fn bound(&self, name: &str) -> Option<&'a LoopBinding> {
        self.binding.filter(|binding| binding.name == name)
    }

    /// Looks a variable up and checks that the actor may read it.
    fn readable(&self, name: &str) -> EvalResult<&'a Variable> {
        let variable = self.lookup(name)?;
        self.check_read(name)?;
        Ok(variable)
    }

    fn lookup(&self, name: &str) -> EvalResult<&'a Variable> {
        self.snapshot
            .variable(name)
            .ok_or_else(|| ExecError::UndefinedVariable(name.to_string()))
    }

    fn check_read(&self, name: &str) -> EvalResult<()> {
        if self.actor == ADMIN
            || self
                .snapshot
                .delegations
                .can_exercise(name, self.actor, Right::Read)
        {
            Ok(())
        } else {
            Err(ExecError::denied(self.actor, name, Right::Read))
        }
    }

    fn field(&self, var: &str, field: &str) -> EvalResult<String> {
        if let Some(binding) = self.bound(var) {
            return project(var, &binding.value, field);
        }
        let variable = self.lookup(var)?;
        let text = project(var, &variable.value, field)?;
        self.check_read(var)?;
        Ok(text)
    }

    fn record(&self, fields: &[(String, FieldValue)]) -> EvalResult<Record> {
        let mut record = Record::with_capacity(fields.len());
        for (name, value) in fields {
            if record.contains_key(name) {
                return Err(ExecError::DuplicateField(name.clone()));
            }
            let text = match value {
                FieldValue::Str(text) => text.clone(),
                FieldValue::Field { var, field } => self.field(var, field)?,
                FieldValue::Var(var) => self.string_var(name, var)?,
            };
            record.insert(name.clone(), text);
        }
        Ok(record)
    }

    /// A bare variable used as a record field must hold a string.
    fn string_var(&self, field: &str, var: &str) -> EvalResult<String> {
        let value = match self.bound(var) {
            Some(binding) => &binding.value,
            None => {
                let variable = self.lookup(var)?;
                if !matches!(variable.value, Value::String(_)) {
                    return Err(ExecError::NonStringField(field.to_string()));
                }
                self.check_read(var)?;
                &variable.value
            }
        };
        match value {
            Value::String(text) => Ok(text.clone()),
            _ => Err(ExecError::NonStringField(field.to_string())),
        }
    }
}

fn project(var: &str, value: &Value, field: &str) -> EvalResult<String> {
    let record = value.as_record().ok_or_else(|| ExecError::TypeMismatch {
        name: var.to_string(),
        expected: "record",
        found: value.kind(),
    })?;
    record
        .get(field)
        .cloned()
        .ok_or_else(|| ExecError::MissingField {
            var: var.to_string(),
            field: field.to_string(),
        })
}
