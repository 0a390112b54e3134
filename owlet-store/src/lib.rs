//! owlet-store: identity-scoped persistence for ledgers and goals.
//!
//! State lives as JSON files under `~/.owlet`. Each identity gets its own
//! directory holding one file per [`Namespace`]; an absent file means the
//! default state. The single published-goal slot sits outside every identity
//! namespace and is shared, last-writer-wins.

pub mod goal_store;
pub mod ledger_store;

pub use goal_store::GoalStore;
pub use ledger_store::LedgerStore;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::PathBuf;

use owlet_core::SavingsGoal;

/// Enumerated persistence namespaces. Each maps to its own file per
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Ledger,
    Balance,
    Goal,
}

impl Namespace {
    fn file_name(self) -> &'static str {
        match self {
            Namespace::Ledger => "ledger.json",
            Namespace::Balance => "balance.json",
            Namespace::Goal => "goal.json",
        }
    }
}

pub fn owlet_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".owlet"))
}

pub fn ensure_owlet_home() -> Result<PathBuf> {
    let dir = owlet_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// `(namespace, identity) -> blob` key-value store over JSON files.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open the store at `~/.owlet`, creating the directory if needed.
    pub fn open() -> Result<Self> {
        Self::open_at(owlet_home()?)
    }

    /// Open at an explicit root (tests, alternate homes).
    pub fn open_at(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).with_context(|| format!("create {}", root.display()))?;
        Ok(Self { root })
    }

    fn key_path(&self, ns: Namespace, identity: Option<&str>) -> PathBuf {
        match identity {
            Some(id) => self.root.join("users").join(safe_dir(id)).join(ns.file_name()),
            None => self.root.join("local").join(ns.file_name()),
        }
    }

    /// Read a namespace value. Absent key means default state, so `None` is
    /// not an error.
    pub fn read<T: DeserializeOwned>(&self, ns: Namespace, identity: Option<&str>) -> Result<Option<T>> {
        let p = self.key_path(ns, identity);
        if !p.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        let value = serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
        Ok(Some(value))
    }

    pub fn write<T: Serialize>(&self, ns: Namespace, identity: Option<&str>, value: &T) -> Result<()> {
        let p = self.key_path(ns, identity);
        if let Some(dir) = p.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
        Ok(())
    }

    /// Drop a key entirely; absent keys are already gone.
    pub fn remove(&self, ns: Namespace, identity: Option<&str>) -> Result<()> {
        let p = self.key_path(ns, identity);
        if p.exists() {
            fs::remove_file(&p).with_context(|| format!("remove {}", p.display()))?;
        }
        Ok(())
    }

    fn public_goal_path(&self) -> PathBuf {
        self.root.join("public_goal.json")
    }

    /// Read the shared published-goal slot. Global, unscoped.
    pub fn read_published_goal(&self) -> Result<Option<SavingsGoal>> {
        let p = self.public_goal_path();
        if !p.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        Ok(Some(serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))?))
    }

    /// Overwrite the shared slot. Concurrent publishers race
    /// last-writer-wins; there is no conflict detection.
    pub fn publish_goal(&self, goal: &SavingsGoal) -> Result<()> {
        let p = self.public_goal_path();
        let json = serde_json::to_string_pretty(goal)?;
        fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
        Ok(())
    }
}

// Keep identity ids filesystem-safe.
fn safe_dir(identity: &str) -> String {
    identity
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use owlet_core::{Category, Transaction, TxKind};

    fn store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_at(dir.path().join("owlet")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_absent_key_reads_none() {
        let (_dir, store) = store();
        let got: Option<f64> = store.read(Namespace::Balance, Some("amber")).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn test_write_read_roundtrip() {
        let (_dir, store) = store();
        store.write(Namespace::Balance, Some("amber"), &1234.5).unwrap();
        let got: Option<f64> = store.read(Namespace::Balance, Some("amber")).unwrap();
        assert_eq!(got, Some(1234.5));
    }

    #[test]
    fn test_identities_are_isolated() {
        let (_dir, store) = store();
        let tx = Transaction::new(9.0, "m", Category::Food, TxKind::Debit, "manual entry");
        store.write(Namespace::Ledger, Some("amber"), &vec![tx]).unwrap();
        store.write(Namespace::Balance, Some("amber"), &50.0).unwrap();

        let other: Option<Vec<Transaction>> = store.read(Namespace::Ledger, Some("blake")).unwrap();
        assert!(other.is_none());
        let local: Option<Vec<Transaction>> = store.read(Namespace::Ledger, None).unwrap();
        assert!(local.is_none());
    }

    #[test]
    fn test_anonymous_namespace_is_its_own() {
        let (_dir, store) = store();
        store.write(Namespace::Balance, None, &77.0).unwrap();
        let anon: Option<f64> = store.read(Namespace::Balance, None).unwrap();
        assert_eq!(anon, Some(77.0));
        let user: Option<f64> = store.read(Namespace::Balance, Some("amber")).unwrap();
        assert!(user.is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, store) = store();
        store.write(Namespace::Goal, Some("amber"), &SavingsGoal::new("Trip", 100.0)).unwrap();
        store.remove(Namespace::Goal, Some("amber")).unwrap();
        store.remove(Namespace::Goal, Some("amber")).unwrap();
        let got: Option<SavingsGoal> = store.read(Namespace::Goal, Some("amber")).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn test_published_slot_last_writer_wins() {
        let (_dir, store) = store();
        store.publish_goal(&SavingsGoal::new("First", 100.0)).unwrap();
        store.publish_goal(&SavingsGoal::new("Second", 200.0)).unwrap();
        let got = store.read_published_goal().unwrap().unwrap();
        assert_eq!(got.title, "Second");
    }

    #[test]
    fn test_safe_dir_replaces_separators() {
        assert_eq!(safe_dir("a/b\\c"), "a-b-c");
        assert_eq!(safe_dir("user@example.com"), "user@example.com");
    }
}
