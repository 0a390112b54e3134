//! Per-identity savings-goal persistence plus the shared published slot.

use anyhow::Result;

use owlet_core::{GoalTracker, SavingsGoal, Transaction};

use crate::{Namespace, Store};

/// A [`GoalTracker`] bound to an identity, persisted after every mutation.
/// No-goal state is stored as an absent key, not a tombstone.
#[derive(Debug)]
pub struct GoalStore {
    store: Store,
    identity: Option<String>,
    tracker: GoalTracker,
}

impl GoalStore {
    pub fn load(store: Store, identity: Option<&str>) -> Result<Self> {
        let goal: Option<SavingsGoal> = store.read(Namespace::Goal, identity)?;
        Ok(Self {
            store,
            identity: identity.map(str::to_string),
            tracker: GoalTracker::new(goal),
        })
    }

    pub fn active(&self) -> Option<&SavingsGoal> {
        self.tracker.active()
    }

    /// See [`GoalTracker::create`]; invalid input is a silent no-op and
    /// nothing is persisted.
    pub fn create(&mut self, title: &str, target: f64) -> Result<bool> {
        let created = self.tracker.create(title, target);
        if created {
            self.persist()?;
        }
        Ok(created)
    }

    /// Contribute and persist; returns the debit transaction the caller must
    /// append to the ledger.
    pub fn contribute(&mut self, amount: f64) -> Result<Option<Transaction>> {
        let tx = self.tracker.contribute(amount);
        if tx.is_some() {
            self.persist()?;
        }
        Ok(tx)
    }

    /// Withdraw and persist; returns the credit transaction to append.
    pub fn withdraw(&mut self, amount: f64) -> Result<Option<Transaction>> {
        let tx = self.tracker.withdraw(amount);
        if tx.is_some() {
            self.persist()?;
        }
        Ok(tx)
    }

    /// Back to no-goal. Ledger history stays untouched.
    pub fn delete(&mut self) -> Result<bool> {
        if self.tracker.delete().is_none() {
            return Ok(false);
        }
        self.store.remove(Namespace::Goal, self.identity.as_deref())?;
        Ok(true)
    }

    /// Copy the active goal into the shared slot (last-writer-wins).
    /// Returns false in the no-goal state.
    pub fn publish(&self) -> Result<bool> {
        match self.tracker.active() {
            Some(goal) => {
                self.store.publish_goal(goal)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Adopt the published goal: only offered in the no-goal state and when
    /// the slot is occupied. The adopted copy gets a fresh id; every other
    /// field, saved amount included, is verbatim.
    pub fn import(&mut self) -> Result<Option<SavingsGoal>> {
        if self.tracker.active().is_some() {
            return Ok(None);
        }
        let Some(published) = self.store.read_published_goal()? else {
            return Ok(None);
        };
        if !self.tracker.adopt(&published) {
            return Ok(None);
        }
        self.persist()?;
        Ok(self.tracker.active().cloned())
    }

    fn persist(&self) -> Result<()> {
        match self.tracker.active() {
            Some(goal) => self.store.write(Namespace::Goal, self.identity.as_deref(), goal),
            None => self.store.remove(Namespace::Goal, self.identity.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(dir: &tempfile::TempDir) -> Store {
        Store::open_at(dir.path().join("owlet")).unwrap()
    }

    #[test]
    fn test_goal_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut gs = GoalStore::load(open(&dir), Some("amber")).unwrap();
        assert!(gs.create("Laptop", 1500.0).unwrap());
        gs.contribute(250.0).unwrap();

        let reloaded = GoalStore::load(open(&dir), Some("amber")).unwrap();
        let goal = reloaded.active().unwrap();
        assert_eq!(goal.title, "Laptop");
        assert_eq!(goal.current_saved, 250.0);
    }

    #[test]
    fn test_delete_clears_persisted_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut gs = GoalStore::load(open(&dir), Some("amber")).unwrap();
        gs.create("Trip", 400.0).unwrap();
        assert!(gs.delete().unwrap());
        assert!(!gs.delete().unwrap());

        let reloaded = GoalStore::load(open(&dir), Some("amber")).unwrap();
        assert!(reloaded.active().is_none());
    }

    #[test]
    fn test_publish_then_import_across_identities() {
        let dir = tempfile::tempdir().unwrap();

        let mut amber = GoalStore::load(open(&dir), Some("amber")).unwrap();
        amber.create("Shared trip", 2000.0).unwrap();
        amber.contribute(500.0).unwrap();
        assert!(amber.publish().unwrap());

        let mut blake = GoalStore::load(open(&dir), Some("blake")).unwrap();
        let imported = blake.import().unwrap().unwrap();
        assert_eq!(imported.title, "Shared trip");
        // Saved amount copies verbatim; only the id is re-minted.
        assert_eq!(imported.current_saved, 500.0);
        assert_ne!(imported.id, amber.active().unwrap().id);
    }

    #[test]
    fn test_import_refused_while_active() {
        let dir = tempfile::tempdir().unwrap();

        let mut amber = GoalStore::load(open(&dir), Some("amber")).unwrap();
        amber.create("Shared", 100.0).unwrap();
        amber.publish().unwrap();

        let mut blake = GoalStore::load(open(&dir), Some("blake")).unwrap();
        blake.create("Mine", 300.0).unwrap();
        assert!(blake.import().unwrap().is_none());
        assert_eq!(blake.active().unwrap().title, "Mine");
    }

    #[test]
    fn test_import_with_empty_slot() {
        let dir = tempfile::tempdir().unwrap();
        let mut gs = GoalStore::load(open(&dir), Some("amber")).unwrap();
        assert!(gs.import().unwrap().is_none());
    }

    #[test]
    fn test_publish_requires_active_goal() {
        let dir = tempfile::tempdir().unwrap();
        let gs = GoalStore::load(open(&dir), Some("amber")).unwrap();
        assert!(!gs.publish().unwrap());
    }
}
