//! Write-through ledger persistence for one identity.

use anyhow::Result;

use owlet_core::{Ledger, Transaction};

use crate::{Namespace, Store};

/// A [`Ledger`] bound to an identity, persisted after every mutation.
/// Transactions and balance live under separate namespaces so a balance
/// override never rewrites the history blob's meaning.
#[derive(Debug)]
pub struct LedgerStore {
    store: Store,
    identity: Option<String>,
    ledger: Ledger,
}

impl LedgerStore {
    /// Load the identity's ledger. Absent data yields an empty list and the
    /// supplied opening balance.
    pub fn load(store: Store, identity: Option<&str>, opening_balance: f64) -> Result<Self> {
        let transactions: Vec<Transaction> = store
            .read(Namespace::Ledger, identity)?
            .unwrap_or_default();
        let balance: f64 = store
            .read(Namespace::Balance, identity)?
            .unwrap_or(opening_balance);

        Ok(Self {
            store,
            identity: identity.map(str::to_string),
            ledger: Ledger::from_parts(balance, transactions),
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Append and persist. The in-memory mutation is total and has already
    /// applied when a persistence error surfaces.
    pub fn append(&mut self, tx: Transaction) -> Result<()> {
        self.ledger.append(tx);
        self.persist()
    }

    /// Remove by id (no-op for unknown ids) and persist.
    pub fn remove(&mut self, id: &str) -> Result<Option<Transaction>> {
        let removed = self.ledger.remove(id);
        self.persist()?;
        Ok(removed)
    }

    /// Override the balance and persist.
    pub fn set_balance(&mut self, value: f64) -> Result<()> {
        self.ledger.set_balance(value);
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let identity = self.identity.as_deref();
        self.store
            .write(Namespace::Ledger, identity, &self.ledger.transactions)?;
        self.store
            .write(Namespace::Balance, identity, &self.ledger.balance)?;
        Ok(())
    }
}
