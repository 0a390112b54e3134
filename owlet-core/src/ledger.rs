//! The transaction ledger: an ordered record list plus a running balance.
//!
//! The balance is a separately tracked running value, not derived from the
//! list, because balance overrides are allowed to break the derivation on
//! purpose. Between overrides, `balance == opening + sum(signed amounts)`.

use crate::transaction::Transaction;

/// Opening balance assumed when an identity has no persisted state yet.
pub const DEFAULT_BALANCE: f64 = 1000.0;

/// One identity's ledger. All mutations are total: any well-formed
/// transaction is accepted, including zero-amount and duplicate ids
/// (duplicate ids are a caller error and not validated here).
#[derive(Debug, Clone)]
pub struct Ledger {
    pub balance: f64,
    /// Newest first by insertion, not by `date`.
    pub transactions: Vec<Transaction>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            balance: DEFAULT_BALANCE,
            transactions: Vec::new(),
        }
    }
}

impl Ledger {
    pub fn new(balance: f64) -> Self {
        Self {
            balance,
            transactions: Vec::new(),
        }
    }

    /// Rebuild from persisted parts.
    pub fn from_parts(balance: f64, transactions: Vec<Transaction>) -> Self {
        Self { balance, transactions }
    }

    /// Insert at the front and apply the balance effect.
    pub fn append(&mut self, tx: Transaction) {
        self.balance += tx.signed_amount();
        self.transactions.insert(0, tx);
    }

    /// Remove by id, reversing the balance effect. Unknown ids are a no-op,
    /// which also makes removal idempotent.
    pub fn remove(&mut self, id: &str) -> Option<Transaction> {
        let idx = self.transactions.iter().position(|t| t.id == id)?;
        let tx = self.transactions.remove(idx);
        self.balance -= tx.signed_amount();
        Some(tx)
    }

    /// Direct balance override, independent of transaction history.
    pub fn set_balance(&mut self, value: f64) {
        self.balance = value;
    }

    /// Most recently inserted record.
    pub fn latest(&self) -> Option<&Transaction> {
        self.transactions.first()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{Category, TxKind};

    fn debit(amount: f64) -> Transaction {
        Transaction::new(amount, "shop", Category::Food, TxKind::Debit, "manual entry")
    }

    fn credit(amount: f64) -> Transaction {
        Transaction::new(amount, "payroll", Category::Other, TxKind::Credit, "manual entry")
    }

    #[test]
    fn test_append_adjusts_balance() {
        let mut ledger = Ledger::new(1000.0);
        ledger.append(debit(50.0));
        ledger.append(credit(200.0));
        assert_eq!(ledger.balance, 1150.0);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_newest_first() {
        let mut ledger = Ledger::default();
        let first = debit(1.0);
        let second = debit(2.0);
        let second_id = second.id.clone();
        ledger.append(first);
        ledger.append(second);
        assert_eq!(ledger.latest().unwrap().id, second_id);
    }

    #[test]
    fn test_remove_reverses_effect() {
        let mut ledger = Ledger::new(500.0);
        let tx = debit(120.0);
        let id = tx.id.clone();
        ledger.append(tx);
        assert_eq!(ledger.balance, 380.0);

        let removed = ledger.remove(&id);
        assert!(removed.is_some());
        assert_eq!(ledger.balance, 500.0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut ledger = Ledger::new(500.0);
        let tx = credit(75.0);
        let id = tx.id.clone();
        ledger.append(tx);

        ledger.remove(&id);
        let balance_after_first = ledger.balance;
        assert!(ledger.remove(&id).is_none());
        assert_eq!(ledger.balance, balance_after_first);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut ledger = Ledger::new(100.0);
        ledger.append(debit(10.0));
        assert!(ledger.remove("nope").is_none());
        assert_eq!(ledger.balance, 90.0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_zero_amount_accepted() {
        let mut ledger = Ledger::new(100.0);
        ledger.append(debit(0.0));
        assert_eq!(ledger.balance, 100.0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_bookkeeping_identity_over_sequence() {
        // balance == opening + sum(credits) - sum(debits), with removal
        // reversing the applied effect.
        let opening = 1000.0;
        let mut ledger = Ledger::new(opening);

        let d1 = debit(30.0);
        let d1_id = d1.id.clone();
        ledger.append(d1);
        ledger.append(credit(500.0));
        ledger.append(debit(12.5));
        ledger.remove(&d1_id);

        assert_eq!(ledger.balance, opening + 500.0 - 12.5);
    }

    #[test]
    fn test_set_balance_overrides_history() {
        let mut ledger = Ledger::new(1000.0);
        ledger.append(debit(10.0));
        ledger.set_balance(250.0);
        assert_eq!(ledger.balance, 250.0);

        // Derivation resumes from the override point.
        ledger.append(credit(50.0));
        assert_eq!(ledger.balance, 300.0);
    }
}
