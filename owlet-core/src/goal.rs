//! Savings goals: at most one active goal per identity, with contribute and
//! withdraw operations that emit matching ledger transactions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transaction::{Category, Transaction, TxKind};

/// A savings target. `current_saved` stays clamped to `[0, target_amount]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavingsGoal {
    pub id: String,
    pub title: String,
    pub target_amount: f64,
    pub current_saved: f64,
}

impl SavingsGoal {
    pub fn new(title: impl Into<String>, target_amount: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            target_amount,
            current_saved: 0.0,
        }
    }

    /// Fresh id, every other field copied verbatim. Imports intentionally
    /// do not reset `current_saved`.
    pub fn reissued(&self) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ..self.clone()
        }
    }

    pub fn remaining(&self) -> f64 {
        self.target_amount - self.current_saved
    }

    /// Percent complete, for display.
    pub fn progress(&self) -> f64 {
        (self.current_saved / self.target_amount) * 100.0
    }
}

/// Two-state machine per identity: no goal, or exactly one active goal.
///
/// Contribute/withdraw return the ledger transaction they imply; the caller
/// appends it. Deleting the goal never reverses transactions already
/// recorded.
#[derive(Debug, Clone, Default)]
pub struct GoalTracker {
    goal: Option<SavingsGoal>,
}

impl GoalTracker {
    pub fn new(goal: Option<SavingsGoal>) -> Self {
        Self { goal }
    }

    pub fn active(&self) -> Option<&SavingsGoal> {
        self.goal.as_ref()
    }

    /// Transition to an active goal. Silent no-op when the title is empty,
    /// the target is not a positive finite number, or a goal already exists.
    pub fn create(&mut self, title: &str, target: f64) -> bool {
        if self.goal.is_some() || title.trim().is_empty() {
            return false;
        }
        if !target.is_finite() || target <= 0.0 {
            return false;
        }
        self.goal = Some(SavingsGoal::new(title.trim(), target));
        true
    }

    /// Move money into the goal, clamped at the target. Returns the debit
    /// transaction to record (contributions reduce spendable balance), or
    /// `None` when there is no active goal or the amount is invalid.
    pub fn contribute(&mut self, amount: f64) -> Option<Transaction> {
        let goal = self.goal.as_mut()?;
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }
        goal.current_saved = (goal.current_saved + amount).min(goal.target_amount);
        Some(Transaction::new(
            amount,
            format!("Savings: {}", goal.title),
            Category::Other,
            TxKind::Debit,
            "savings contribution",
        ))
    }

    /// Move money back out, clamped at zero. Returns the credit transaction
    /// to record, or `None` when inactive or the amount is invalid.
    pub fn withdraw(&mut self, amount: f64) -> Option<Transaction> {
        let goal = self.goal.as_mut()?;
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }
        goal.current_saved = (goal.current_saved - amount).max(0.0);
        Some(Transaction::new(
            amount,
            format!("Withdraw: {}", goal.title),
            Category::Other,
            TxKind::Credit,
            "savings withdrawal",
        ))
    }

    /// Transition back to no-goal. Prior contribution/withdrawal
    /// transactions stay in the ledger.
    pub fn delete(&mut self) -> Option<SavingsGoal> {
        self.goal.take()
    }

    /// Adopt a goal published by another identity: only from the no-goal
    /// state, with a fresh id and every other field copied verbatim.
    pub fn adopt(&mut self, published: &SavingsGoal) -> bool {
        if self.goal.is_some() {
            return false;
        }
        self.goal = Some(published.reissued());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_title_and_positive_target() {
        let mut tracker = GoalTracker::default();
        assert!(!tracker.create("", 100.0));
        assert!(!tracker.create("   ", 100.0));
        assert!(!tracker.create("Laptop", 0.0));
        assert!(!tracker.create("Laptop", -5.0));
        assert!(!tracker.create("Laptop", f64::NAN));
        assert!(tracker.active().is_none());

        assert!(tracker.create("Laptop", 1500.0));
        let goal = tracker.active().unwrap();
        assert_eq!(goal.title, "Laptop");
        assert_eq!(goal.current_saved, 0.0);
    }

    #[test]
    fn test_create_is_noop_while_active() {
        let mut tracker = GoalTracker::default();
        assert!(tracker.create("Trip", 800.0));
        assert!(!tracker.create("Other thing", 50.0));
        assert_eq!(tracker.active().unwrap().title, "Trip");
    }

    #[test]
    fn test_contribute_clamps_and_emits_debit() {
        let mut goal = SavingsGoal::new("Bike", 1000.0);
        goal.current_saved = 900.0;
        let mut tracker = GoalTracker::new(Some(goal));

        let tx = tracker.contribute(300.0).unwrap();
        assert_eq!(tracker.active().unwrap().current_saved, 1000.0);
        assert_eq!(tx.amount, 300.0);
        assert_eq!(tx.kind, TxKind::Debit);
        assert_eq!(tx.merchant, "Savings: Bike");
    }

    #[test]
    fn test_withdraw_clamps_and_emits_credit() {
        let mut goal = SavingsGoal::new("Bike", 1000.0);
        goal.current_saved = 100.0;
        let mut tracker = GoalTracker::new(Some(goal));

        let tx = tracker.withdraw(500.0).unwrap();
        assert_eq!(tracker.active().unwrap().current_saved, 0.0);
        assert_eq!(tx.amount, 500.0);
        assert_eq!(tx.kind, TxKind::Credit);
    }

    #[test]
    fn test_contribute_rejects_invalid_amounts() {
        let mut tracker = GoalTracker::default();
        assert!(tracker.contribute(10.0).is_none());

        tracker.create("Trip", 500.0);
        assert!(tracker.contribute(0.0).is_none());
        assert!(tracker.contribute(-3.0).is_none());
        assert_eq!(tracker.active().unwrap().current_saved, 0.0);
    }

    #[test]
    fn test_delete_returns_to_no_goal() {
        let mut tracker = GoalTracker::default();
        tracker.create("Trip", 500.0);
        assert!(tracker.delete().is_some());
        assert!(tracker.active().is_none());
        assert!(tracker.delete().is_none());
    }

    #[test]
    fn test_adopt_copies_saved_verbatim_with_fresh_id() {
        let mut published = SavingsGoal::new("Shared trip", 2000.0);
        published.current_saved = 650.0;

        let mut tracker = GoalTracker::default();
        assert!(tracker.adopt(&published));

        let adopted = tracker.active().unwrap();
        assert_ne!(adopted.id, published.id);
        assert_eq!(adopted.title, published.title);
        assert_eq!(adopted.current_saved, 650.0);
    }

    #[test]
    fn test_adopt_only_from_no_goal() {
        let published = SavingsGoal::new("Shared", 100.0);
        let mut tracker = GoalTracker::default();
        tracker.create("Mine", 300.0);
        assert!(!tracker.adopt(&published));
        assert_eq!(tracker.active().unwrap().title, "Mine");
    }
}
