//! Per-variable, per-right delegation edges and the authority query over them.
//!
//! An edge `(variable, right, holder) -> {grantors}` records that each grantor
//! handed `right` on `variable` to `holder`. Authority flows from a holder back
//! through its grantors; a principal holds a right when that walk reaches
//! `admin`. The walk always starts from both the principal and `anyone`.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use acldb_lang::Right;

use crate::principal::{ADMIN, ANYONE};

type Holders = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegationGraph {
    edges: BTreeMap<String, BTreeMap<Right, Holders>>,
}

impl DelegationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `grantor` gave `right` on `variable` to `holder`. Idempotent.
    pub fn grant(&mut self, variable: &str, right: Right, holder: &str, grantor: &str) {
        self.edges
            .entry(variable.to_string())
            .or_default()
            .entry(right)
            .or_default()
            .entry(holder.to_string())
            .or_default()
            .insert(grantor.to_string());
    }

    /// Grants all four rights at once.
    pub fn grant_all(&mut self, variable: &str, holder: &str, grantor: &str) {
        for right in Right::ALL {
            self.grant(variable, right, holder, grantor);
        }
    }

    /// Withdraws `grantor`'s contribution to `holder`'s right.
    ///
    /// When `holder == grantor` the holder is denying itself the right, so the
    /// whole edge goes regardless of who else contributed. Principals that
    /// received the right from `holder` keep their own edges.
    pub fn revoke(&mut self, variable: &str, right: Right, holder: &str, grantor: &str) {
        let Some(holders) = self
            .edges
            .get_mut(variable)
            .and_then(|rights| rights.get_mut(&right))
        else {
            return;
        };
        if holder == grantor {
            holders.remove(holder);
        } else if let Some(grantors) = holders.get_mut(holder) {
            grantors.remove(grantor);
            if grantors.is_empty() {
                holders.remove(holder);
            }
        }
    }

    /// Grantors currently recorded on `holder`'s edge.
    pub fn grantors(&self, variable: &str, right: Right, holder: &str) -> Vec<&str> {
        self.holders(variable, right)
            .and_then(|holders| holders.get(holder))
            .map(|grantors| grantors.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether `principal` may exercise `right` on `variable`.
    ///
    /// Breadth-first walk from `{anyone, principal}` towards grantors. The
    /// visited set bounds the walk on delegation cycles that never reach admin.
    pub fn can_exercise(&self, variable: &str, principal: &str, right: Right) -> bool {
        let holders = self.holders(variable, right);
        let mut queue: VecDeque<&str> = VecDeque::from([ANYONE, principal]);
        let mut visited: HashSet<&str> = HashSet::new();

        while let Some(current) = queue.pop_front() {
            if current == ADMIN {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            let Some(grantors) = holders.and_then(|holders| holders.get(current)) else {
                continue;
            };
            queue.extend(
                grantors
                    .iter()
                    .map(String::as_str)
                    .filter(|grantor| !visited.contains(grantor)),
            );
        }
        false
    }

    /// Drops every edge recorded for `variable`.
    pub fn forget_variable(&mut self, variable: &str) {
        self.edges.remove(variable);
    }

    /// Number of holders with at least one grantor, across all variables and rights.
    pub fn edge_count(&self) -> usize {
        self.edges
            .values()
            .flat_map(|rights| rights.values())
            .map(|holders| holders.len())
            .sum()
    }

    fn holders(&self, variable: &str, right: Right) -> Option<&Holders> {
        self.edges.get(variable).and_then(|rights| rights.get(&right))
    }
}
