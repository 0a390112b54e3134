//! owlet-core: ledger, analytics, and savings-goal domain logic.
//!
//! Pure state and math only; persistence lives in owlet-store, collaborator
//! calls in owlet-advisor.

pub mod analytics;
pub mod goal;
pub mod ledger;
pub mod transaction;

pub use goal::{GoalTracker, SavingsGoal};
pub use ledger::{DEFAULT_BALANCE, Ledger};
pub use transaction::{Category, GeoPoint, Transaction, TxKind};
