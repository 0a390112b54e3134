//! owlet-advisor: the external AI collaborator boundary.
//!
//! Classification turns free text or receipt images into best-effort
//! transaction fields; advisory calls produce runway projections, peer
//! benchmarks, goal strategies, and feedback text. Everything here is
//! unreliable by contract: callers default, fall back, and never let a
//! collaborator failure touch ledger state.

pub mod advice;
pub mod classify;
pub mod gemini;

pub use advice::{
    BUDDY_FALLBACK, ComparisonRow, GoalStrategy, RunwayAnalysis, TIP_FALLBACK, buddy_feedback,
    goal_strategy, peer_comparison, runway, savings_tip,
};
pub use classify::{Classification, classify_message, classify_receipt};
pub use gemini::{FAST_MODEL, GeminiConfig, PRO_MODEL};
