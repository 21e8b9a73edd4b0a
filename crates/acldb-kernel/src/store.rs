//! Variable store with a working copy and a committed copy.

use indexmap::IndexMap;
use log::debug;

use crate::delegation::DelegationGraph;
use crate::principal::{ANYONE, PrincipalRegistry};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub value: Value,
    /// Once set the variable is dropped at the end of the program.
    pub local: bool,
}

impl Variable {
    pub fn global(value: Value) -> Self {
        Self {
            value,
            local: false,
        }
    }

    pub fn local(value: Value) -> Self {
        Self { value, local: true }
    }

    pub fn kind(&self) -> &'static str {
        self.value.kind()
    }
}

/// Everything a program can change, captured as one unit for commit/rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub principals: PrincipalRegistry,
    pub variables: IndexMap<String, Variable>,
    pub delegations: DelegationGraph,
    pub default_delegator: String,
}

impl Snapshot {
    pub fn bootstrap(admin_password: impl Into<String>) -> Self {
        Self {
            principals: PrincipalRegistry::bootstrap(admin_password),
            variables: IndexMap::new(),
            delegations: DelegationGraph::new(),
            default_delegator: ANYONE.to_string(),
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Names of non-local variables, in creation order.
    pub fn global_names(&self) -> Vec<String> {
        self.variables
            .iter()
            .filter(|(_, var)| !var.local)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Removes local variables along with their delegation edges.
    pub fn purge_locals(&mut self) {
        let locals: Vec<String> = self
            .variables
            .iter()
            .filter(|(_, var)| var.local)
            .map(|(name, _)| name.clone())
            .collect();
        for name in locals {
            self.variables.shift_remove(&name);
            self.delegations.forget_variable(&name);
        }
    }
}

/// Working/master pair. Programs mutate only the working snapshot.
#[derive(Debug, Clone)]
pub struct Store {
    master: Snapshot,
    working: Snapshot,
}

impl Store {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            working: initial.clone(),
            master: initial,
        }
    }

    pub fn working(&self) -> &Snapshot {
        &self.working
    }

    pub fn working_mut(&mut self) -> &mut Snapshot {
        &mut self.working
    }

    pub fn committed(&self) -> &Snapshot {
        &self.master
    }

    /// Drops locals and promotes the working snapshot.
    pub fn commit(&mut self) {
        self.working.purge_locals();
        self.master = self.working.clone();
        debug!(
            "committed {} variables, {} principals",
            self.master.variables.len(),
            self.master.principals.len()
        );
    }

    /// Discards working changes by restoring the committed snapshot.
    pub fn rollback(&mut self) {
        self.working = self.master.clone();
        debug!("rolled back to committed snapshot");
    }
}
