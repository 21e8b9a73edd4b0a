//! One handler per command. Each handler validates in a fixed order, stops at the
//! first unmet check, and only then mutates the working snapshot.

use acldb_lang::{Command, Expr, Right, Target};
use log::trace;

use crate::error::ExecError;
use crate::eval::{Evaluator, LoopBinding};
use crate::principal::ADMIN;
use crate::status::{Status, StatusCode};
use crate::store::{Snapshot, Variable};
use crate::value::Value;

pub type DispatchResult = Result<Status, ExecError>;

/// Applies commands to a working snapshot on behalf of an authenticated principal.
pub struct Dispatcher<'a> {
    snapshot: &'a mut Snapshot,
    actor: &'a str,
}

impl<'a> Dispatcher<'a> {
    pub fn new(snapshot: &'a mut Snapshot, actor: &'a str) -> Self {
        Self { snapshot, actor }
    }

    pub fn execute(&mut self, command: &Command) -> DispatchResult {
        trace!("{} as {}", command.label(), self.actor);
        match command {
            Command::CreatePrincipal { name, password } => self.create_principal(name, password),
            Command::ChangePassword { name, password } => self.change_password(name, password),
            Command::Set { name, expr } => self.set(name, expr),
            Command::AppendTo { name, expr } => self.append_to(name, expr),
            Command::Local { name, expr } => self.local(name, expr),
            Command::ForEach { item, list, expr } => self.for_each(item, list, expr),
            Command::SetDelegation {
                target,
                grantor,
                right,
                holder,
            } => self.set_delegation(target, grantor, *right, holder),
            Command::DeleteDelegation {
                target,
                grantor,
                right,
                holder,
            } => self.delete_delegation(target, grantor, *right, holder),
            Command::DefaultDelegator { name } => self.default_delegator(name),
            Command::Exit => self.exit(),
            Command::Return { expr } => Ok(Status::returning(self.eval(expr)?)),
        }
    }

    fn is_admin(&self) -> bool {
        self.actor == ADMIN
    }

    fn may(&self, variable: &str, principal: &str, right: Right) -> bool {
        principal == ADMIN
            || self
                .snapshot
                .delegations
                .can_exercise(variable, principal, right)
    }

    fn require(&self, variable: &str, right: Right) -> Result<(), ExecError> {
        if self.may(variable, self.actor, right) {
            Ok(())
        } else {
            Err(ExecError::denied(self.actor, variable, right))
        }
    }

    fn require_principal(&self, name: &str) -> Result<(), ExecError> {
        if self.snapshot.principals.contains(name) {
            Ok(())
        } else {
            Err(ExecError::UnknownPrincipal(name.to_string()))
        }
    }

    fn existing(&self, name: &str) -> Result<&Variable, ExecError> {
        self.snapshot
            .variable(name)
            .ok_or_else(|| ExecError::UndefinedVariable(name.to_string()))
    }

    fn eval(&self, expr: &Expr) -> Result<Value, ExecError> {
        Evaluator::new(&*self.snapshot, self.actor).eval(expr)
    }

    fn store(&mut self, name: &str, value: Value) {
        if let Some(variable) = self.snapshot.variables.get_mut(name) {
            variable.value = value;
        }
    }

    /// Adds a variable holding an empty string and hands its creator every right.
    fn create_variable(&mut self, name: &str, variable: Variable) {
        self.snapshot.variables.insert(name.to_string(), variable);
        if !self.is_admin() {
            self.snapshot.delegations.grant_all(name, self.actor, ADMIN);
        }
    }

    /// Non-local variables on which `grantor` may delegate, in creation order.
    fn delegable_by(&self, grantor: &str) -> Vec<String> {
        self.snapshot
            .global_names()
            .into_iter()
            .filter(|name| self.may(name, grantor, Right::Delegate))
            .collect()
    }

    fn create_principal(&mut self, name: &str, password: &str) -> DispatchResult {
        if !self.is_admin() {
            return Err(ExecError::not_authorized(self.actor, "create principals"));
        }
        if self.snapshot.principals.contains(name) {
            return Err(ExecError::PrincipalExists(name.to_string()));
        }
        self.snapshot.principals.insert(name, password);

        let delegator = self.snapshot.default_delegator.clone();
        for variable in self.delegable_by(&delegator) {
            self.snapshot
                .delegations
                .grant_all(&variable, name, &delegator);
        }
        Ok(StatusCode::CreatePrincipal.into())
    }

    fn change_password(&mut self, name: &str, password: &str) -> DispatchResult {
        self.require_principal(name)?;
        if !self.is_admin() && self.actor != name {
            return Err(ExecError::not_authorized(self.actor, "change this password"));
        }
        self.snapshot.principals.set_password(name, password);
        Ok(StatusCode::ChangePassword.into())
    }

    fn set(&mut self, name: &str, expr: &Expr) -> DispatchResult {
        if self.snapshot.variable(name).is_none() {
            self.create_variable(name, Variable::global(Value::default()));
        }
        self.require(name, Right::Write)?;
        let value = self.eval(expr)?;
        self.store(name, value);
        Ok(StatusCode::Set.into())
    }

    fn append_to(&mut self, name: &str, expr: &Expr) -> DispatchResult {
        let current = self.existing(name)?;
        if !current.value.is_list() {
            return Err(ExecError::TypeMismatch {
                name: name.to_string(),
                expected: "list",
                found: current.kind(),
            });
        }
        if !self.may(name, self.actor, Right::Write) {
            self.require(name, Right::Append)?;
        }
        let value = self.eval(expr)?;
        if let Some(Variable {
            value: Value::List(items),
            ..
        }) = self.snapshot.variables.get_mut(name)
        {
            match value {
                Value::List(more) => items.extend(more),
                single => items.push(single),
            }
        }
        Ok(StatusCode::Append.into())
    }

    fn local(&mut self, name: &str, expr: &Expr) -> DispatchResult {
        if self.snapshot.variable(name).is_some() {
            return Err(ExecError::VariableExists(name.to_string()));
        }
        self.create_variable(name, Variable::local(Value::default()));
        let value = self.eval(expr)?;
        self.store(name, value);
        Ok(StatusCode::Local.into())
    }

    fn for_each(&mut self, item: &str, list: &str, expr: &Expr) -> DispatchResult {
        self.existing(list)?;
        self.require(list, Right::Read)?;
        self.require(list, Right::Write)?;
        if self.snapshot.variable(item).is_some() {
            return Err(ExecError::VariableExists(item.to_string()));
        }
        let elements = match &self.existing(list)?.value {
            Value::List(items) => items.clone(),
            other => {
                return Err(ExecError::TypeMismatch {
                    name: list.to_string(),
                    expected: "list",
                    found: other.kind(),
                });
            }
        };

        let mut replaced = Vec::with_capacity(elements.len());
        for element in elements {
            let binding = LoopBinding::new(item, element);
            let value = Evaluator::new(&*self.snapshot, self.actor)
                .with_binding(&binding)
                .eval(expr)?;
            if value.is_list() {
                return Err(ExecError::ListReplacement);
            }
            replaced.push(value);
        }
        self.store(list, Value::List(replaced));
        Ok(StatusCode::Foreach.into())
    }

    /// Shared checks for both delegation commands; returns the variables to update.
    fn delegation_targets(
        &self,
        target: &Target,
        grantor: &str,
        holder: &str,
        revoking: bool,
    ) -> Result<Vec<String>, ExecError> {
        self.require_principal(grantor)?;
        let on_behalf = self.is_admin() || self.actor == grantor || (revoking && self.actor == holder);
        if !on_behalf {
            return Err(ExecError::not_authorized(self.actor, "delegate for another principal"));
        }
        self.require_principal(holder)?;

        match target {
            Target::All => Ok(self.delegable_by(grantor)),
            Target::Variable(name) => {
                if self.existing(name)?.local {
                    return Err(ExecError::LocalVariable(name.clone()));
                }
                let self_revoke = revoking && grantor == holder;
                if !self.is_admin() && !self_revoke && !self.may(name, grantor, Right::Delegate) {
                    return Err(ExecError::denied(grantor, name, Right::Delegate));
                }
                Ok(vec![name.clone()])
            }
        }
    }

    fn set_delegation(
        &mut self,
        target: &Target,
        grantor: &str,
        right: Right,
        holder: &str,
    ) -> DispatchResult {
        for variable in self.delegation_targets(target, grantor, holder, false)? {
            self.snapshot
                .delegations
                .grant(&variable, right, holder, grantor);
        }
        Ok(StatusCode::SetDelegation.into())
    }

    fn delete_delegation(
        &mut self,
        target: &Target,
        grantor: &str,
        right: Right,
        holder: &str,
    ) -> DispatchResult {
        for variable in self.delegation_targets(target, grantor, holder, true)? {
            self.snapshot
                .delegations
                .revoke(&variable, right, holder, grantor);
        }
        Ok(StatusCode::DeleteDelegation.into())
    }

    fn default_delegator(&mut self, name: &str) -> DispatchResult {
        self.require_principal(name)?;
        if !self.is_admin() {
            return Err(ExecError::not_authorized(self.actor, "set the default delegator"));
        }
        self.snapshot.default_delegator = name.to_string();
        Ok(StatusCode::DefaultDelegator.into())
    }

    fn exit(&mut self) -> DispatchResult {
        if !self.is_admin() {
            return Err(ExecError::not_authorized(self.actor, "exit"));
        }
        Ok(StatusCode::Exiting.into())
    }
}
