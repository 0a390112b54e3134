//! Transaction record types shared across the workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Spending category, a closed set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "food")]
    Food,
    #[serde(rename = "travel")]
    Travel,
    #[serde(rename = "fun")]
    Fun,
    #[serde(rename = "academic")]
    Academic,
    #[serde(rename = "other")]
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Travel,
        Category::Fun,
        Category::Academic,
        Category::Other,
    ];

    /// Human-readable label (also the wire spelling classifiers are asked for).
    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Fun => "Fun",
            Category::Academic => "Academic",
            Category::Other => "Other",
        }
    }

    /// Case-insensitive match against the closed set. Unknown input is the
    /// caller's problem; classifiers default it to `Other`.
    pub fn parse_loose(s: &str) -> Option<Category> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
    }
}

/// Whether a transaction increases or decreases the balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxKind {
    #[serde(rename = "credit")]
    Credit,
    #[serde(rename = "debit")]
    Debit,
}

impl TxKind {
    pub fn label(&self) -> &'static str {
        match self {
            TxKind::Credit => "credit",
            TxKind::Debit => "debit",
        }
    }
}

/// Geographic point attached opportunistically to a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
}

/// A single ledger record. Immutable once created; deletion only, no edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Unique opaque identifier.
    pub id: String,
    /// Absolute monetary quantity; the sign lives in `kind`.
    pub amount: f64,
    /// Display label, free text.
    pub merchant: String,
    pub category: Category,
    pub kind: TxKind,
    /// Timestamp of record creation, not the real-world transaction time.
    pub date: DateTime<Utc>,
    /// Free-text provenance note ("manual entry", "SMS: ...", ...). Never parsed.
    pub origin: String,
    pub location: Option<GeoPoint>,
}

impl Transaction {
    /// Create a record stamped now. Negative input amounts are folded to
    /// their absolute value; `kind` alone carries the sign.
    pub fn new(
        amount: f64,
        merchant: impl Into<String>,
        category: Category,
        kind: TxKind,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            amount: amount.abs(),
            merchant: merchant.into(),
            category,
            kind,
            date: Utc::now(),
            origin: origin.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: Option<GeoPoint>) -> Self {
        self.location = location;
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Balance delta this record applies: positive for credits, negative for
    /// debits.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TxKind::Credit => self.amount,
            TxKind::Debit => -self.amount,
        }
    }
}
