//! Program controller: authenticate, dispatch in order, then commit or roll back.

use acldb_lang::{Program, Right, parse_program};

use crate::dispatch::Dispatcher;
use crate::error::{ExecError, Severity};
use crate::principal::ANYONE;
use crate::status::{Status, StatusCode};
use crate::store::{Snapshot, Store, Variable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    pub admin_password: String,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            admin_password: "admin".into(),
        }
    }
}

/// How a program ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Committed,
    Failed,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramOutcome {
    pub statuses: Vec<Status>,
    pub verdict: Verdict,
    /// Set after a committed admin `exit`.
    pub shutdown: bool,
}

impl ProgramOutcome {
    fn committed(statuses: Vec<Status>) -> Self {
        let shutdown = statuses
            .last()
            .is_some_and(|status| status.status == StatusCode::Exiting);
        Self {
            statuses,
            verdict: Verdict::Committed,
            shutdown,
        }
    }

    fn rejected(severity: Severity) -> Self {
        let (code, verdict) = match severity {
            Severity::Failure => (StatusCode::Failed, Verdict::Failed),
            Severity::SecurityViolation => (StatusCode::Denied, Verdict::Denied),
        };
        Self {
            statuses: vec![Status::new(code)],
            verdict,
            shutdown: false,
        }
    }

    /// Newline-delimited JSON, one record per line.
    pub fn to_ndjson(&self) -> String {
        self.statuses
            .iter()
            .map(|status| status.to_json() + "\n")
            .collect()
    }
}

/// Owns the store for the lifetime of the process; runs one program at a time.
#[derive(Debug)]
pub struct Kernel {
    store: Store,
}

impl Kernel {
    /// Bootstraps `admin` and `anyone` and commits that state.
    pub fn new(config: KernelConfig) -> Self {
        let mut store = Store::new(Snapshot::bootstrap(config.admin_password));
        store.commit();
        Self { store }
    }

    pub fn run_program(&mut self, text: &str) -> ProgramOutcome {
        match parse_program(text) {
            Ok(program) => self.run_parsed(&program),
            Err(err) => {
                let err = ExecError::from(err);
                log::debug!("program rejected: {err}");
                ProgramOutcome::rejected(err.severity())
            }
        }
    }

    pub fn run_parsed(&mut self, program: &Program) -> ProgramOutcome {
        if let Err(err) = self.authenticate(&program.principal, &program.password) {
            log::info!("authentication failed: {err}");
            return ProgramOutcome::rejected(err.severity());
        }

        let mut statuses = Vec::with_capacity(program.commands.len());
        let mut dispatcher = Dispatcher::new(self.store.working_mut(), &program.principal);
        for command in &program.commands {
            match dispatcher.execute(command) {
                Ok(status) => {
                    statuses.push(status);
                    if command.is_terminal() {
                        break;
                    }
                }
                Err(err) => {
                    log::info!(
                        "'{}' failed as {}: {err}; rolling back",
                        command.label(),
                        program.principal
                    );
                    self.store.rollback();
                    return ProgramOutcome::rejected(err.severity());
                }
            }
        }

        self.store.commit();
        let outcome = ProgramOutcome::committed(statuses);
        log::debug!(
            "program by {} committed {} statuses",
            program.principal,
            outcome.statuses.len()
        );
        outcome
    }

    fn authenticate(&self, principal: &str, password: &str) -> Result<(), ExecError> {
        let principals = &self.store.committed().principals;
        if principal == ANYONE {
            return Err(ExecError::AuthenticationFailed(principal.to_string()));
        }
        if !principals.contains(principal) {
            return Err(ExecError::UnknownPrincipal(principal.to_string()));
        }
        if !principals.verify(principal, password) {
            return Err(ExecError::AuthenticationFailed(principal.to_string()));
        }
        Ok(())
    }

    /// Committed state.
    pub fn snapshot(&self) -> &Snapshot {
        self.store.committed()
    }

    pub fn principal_exists(&self, name: &str) -> bool {
        self.snapshot().principals.contains(name)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.snapshot().variable(name)
    }

    pub fn can_exercise(&self, variable: &str, principal: &str, right: Right) -> bool {
        self.snapshot()
            .delegations
            .can_exercise(variable, principal, right)
    }

    pub fn default_delegator(&self) -> &str {
        &self.snapshot().default_delegator
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new(KernelConfig::default())
    }
}
