//! Transactional interpreter core: value model, principals, delegation graph,
//! variable store, expression evaluation, command dispatch, and the program controller.

pub mod delegation;
pub mod dispatch;
pub mod error;
pub mod eval;
pub mod kernel;
pub mod principal;
pub mod status;
pub mod store;
pub mod value;

pub use delegation::DelegationGraph;
pub use error::{ExecError, Severity};
pub use eval::{Evaluator, LoopBinding};
pub use kernel::{Kernel, KernelConfig, ProgramOutcome, Verdict};
pub use principal::{ADMIN, ANYONE, PrincipalRegistry};
pub use status::{Status, StatusCode};
pub use store::{Snapshot, Store, Variable};
pub use value::{Record, Value};

pub use acldb_lang::Right;
