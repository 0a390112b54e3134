//! Pure derived metrics over a ledger snapshot.
//!
//! Everything here is deterministic and recomputed per read; nothing touches
//! storage or the network. The `*_request` builders assemble the summaries
//! handed to the advisory collaborator.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::goal::SavingsGoal;
use crate::transaction::{Category, Transaction, TxKind};

/// Totals across the whole snapshot. `average_ticket` is spend per debit,
/// defined as 0 when there are no debits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendingSummary {
    pub spent: f64,
    pub income: f64,
    pub average_ticket: f64,
}

pub fn spending_summary(txs: &[Transaction]) -> SpendingSummary {
    let mut spent = 0.0;
    let mut income = 0.0;
    let mut debit_count = 0usize;

    for tx in txs {
        match tx.kind {
            TxKind::Debit => {
                spent += tx.amount;
                debit_count += 1;
            }
            TxKind::Credit => income += tx.amount,
        }
    }

    let average_ticket = if debit_count > 0 {
        spent / debit_count as f64
    } else {
        0.0
    };

    SpendingSummary {
        spent,
        income,
        average_ticket,
    }
}

/// Spending per category, debits only; credits never count toward spending.
/// Every category appears, in display order, zero included.
pub fn category_totals(txs: &[Transaction]) -> Vec<(Category, f64)> {
    Category::ALL
        .into_iter()
        .map(|cat| {
            let total = txs
                .iter()
                .filter(|t| t.kind == TxKind::Debit && t.category == cat)
                .map(|t| t.amount)
                .sum();
            (cat, total)
        })
        .collect()
}

/// Whole days since the most recently inserted record, measured midnight to
/// midnight in the caller's timezone. 0 for an empty ledger.
///
/// This counts recency of any record, not specifically absence of spending.
pub fn no_spend_streak(txs: &[Transaction], tz: chrono_tz::Tz, today: NaiveDate) -> i64 {
    let Some(last) = txs.first() else {
        return 0;
    };
    let last_day = last.date.with_timezone(&tz).date_naive();
    (today - last_day).num_days()
}

/// Fun-category spend vs. total spend over the trailing 7 days, debits only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyFun {
    pub fun_spent: f64,
    pub total_spent: f64,
}

pub fn weekly_fun(txs: &[Transaction], now: DateTime<Utc>) -> WeeklyFun {
    let window_start = now - Duration::days(7);
    let mut fun_spent = 0.0;
    let mut total_spent = 0.0;

    for tx in txs {
        if tx.date <= window_start || tx.kind != TxKind::Debit {
            continue;
        }
        total_spent += tx.amount;
        if tx.category == Category::Fun {
            fun_spent += tx.amount;
        }
    }

    WeeklyFun {
        fun_spent,
        total_spent,
    }
}

/// Inputs for the witty-counselor feedback call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuddyStats {
    pub fun_spent: f64,
    pub total_spent: f64,
    pub streak_days: i64,
}

pub fn buddy_stats(
    txs: &[Transaction],
    now: DateTime<Utc>,
    tz: chrono_tz::Tz,
    today: NaiveDate,
) -> BuddyStats {
    let week = weekly_fun(txs, now);
    BuddyStats {
        fun_spent: week.fun_spent,
        total_spent: week.total_spent,
        streak_days: no_spend_streak(txs, tz, today),
    }
}

/// One history row handed to the advisor.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub amount: f64,
    pub category: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl HistoryEntry {
    fn from_tx(tx: &Transaction) -> Self {
        Self {
            date: tx.date,
            amount: tx.amount,
            category: tx.category.label(),
            kind: tx.kind.label(),
        }
    }
}

/// Runway projection request: full history plus current balance. The advisor
/// owns the projection itself; nothing here is interpreted locally.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunwayRequest {
    pub history: Vec<HistoryEntry>,
    pub balance: f64,
}

pub fn runway_request(txs: &[Transaction], balance: f64) -> RunwayRequest {
    RunwayRequest {
        history: txs.iter().map(HistoryEntry::from_tx).collect(),
        balance,
    }
}

/// Per-category debit totals for peer benchmarking.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategorySpend {
    pub category: &'static str,
    pub amount: f64,
}

pub fn peer_request(txs: &[Transaction]) -> Vec<CategorySpend> {
    category_totals(txs)
        .into_iter()
        .map(|(cat, amount)| CategorySpend {
            category: cat.label(),
            amount,
        })
        .collect()
}

/// One recent debit shown to the strategy advisor.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DebitEntry {
    pub date: DateTime<Utc>,
    pub merchant: String,
    pub amount: f64,
    pub category: &'static str,
}

/// Goal-strategy request. The remaining amount is computed locally as
/// `target - saved`; the advisor only suggests what to skip.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoalStrategyRequest {
    pub title: String,
    pub remaining: f64,
    pub recent_debits: Vec<DebitEntry>,
}

pub fn goal_strategy_request(goal: &SavingsGoal, txs: &[Transaction]) -> GoalStrategyRequest {
    let recent_debits = txs
        .iter()
        .filter(|t| t.kind == TxKind::Debit)
        .take(10)
        .map(|t| DebitEntry {
            date: t.date,
            merchant: t.merchant.clone(),
            amount: t.amount,
            category: t.category.label(),
        })
        .collect();

    GoalStrategyRequest {
        title: goal.title.clone(),
        remaining: goal.remaining(),
        recent_debits,
    }
}

/// "Merchant ($amount)" pairs for the newest records, for the savings-tip
/// prompt.
pub fn recent_summary(txs: &[Transaction], limit: usize) -> String {
    txs.iter()
        .take(limit)
        .map(|t| format!("{} (${:.2})", t.merchant, t.amount))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx(amount: f64, category: Category, kind: TxKind) -> Transaction {
        Transaction::new(amount, "m", category, kind, "manual entry")
    }

    #[test]
    fn test_summary_on_empty_ledger() {
        let s = spending_summary(&[]);
        assert_eq!(s.spent, 0.0);
        assert_eq!(s.income, 0.0);
        assert_eq!(s.average_ticket, 0.0);
    }

    #[test]
    fn test_average_ticket_zero_without_debits() {
        let txs = vec![tx(200.0, Category::Other, TxKind::Credit)];
        assert_eq!(spending_summary(&txs).average_ticket, 0.0);
    }

    #[test]
    fn test_summary_scenario() {
        // append debit 50 Food, credit 200 on an empty ledger
        let txs = vec![
            tx(200.0, Category::Other, TxKind::Credit),
            tx(50.0, Category::Food, TxKind::Debit),
        ];
        let s = spending_summary(&txs);
        assert_eq!(s.spent, 50.0);
        assert_eq!(s.income, 200.0);
        assert_eq!(s.average_ticket, 50.0);

        let totals = category_totals(&txs);
        for (cat, total) in totals {
            let expected = if cat == Category::Food { 50.0 } else { 0.0 };
            assert_eq!(total, expected, "unexpected total for {}", cat.label());
        }
    }

    #[test]
    fn test_credits_never_count_as_spending() {
        let txs = vec![
            tx(300.0, Category::Fun, TxKind::Credit),
            tx(20.0, Category::Fun, TxKind::Debit),
        ];
        let totals = category_totals(&txs);
        let fun = totals
            .iter()
            .find(|(c, _)| *c == Category::Fun)
            .map(|(_, t)| *t)
            .unwrap();
        assert_eq!(fun, 20.0);
    }

    #[test]
    fn test_streak_three_days() {
        let tz = chrono_tz::UTC;
        let today = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        let when = Utc.with_ymd_and_hms(2026, 8, 1, 15, 30, 0).unwrap();
        let txs = vec![tx(10.0, Category::Food, TxKind::Debit).with_date(when)];
        assert_eq!(no_spend_streak(&txs, tz, today), 3);
    }

    #[test]
    fn test_streak_empty_ledger() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        assert_eq!(no_spend_streak(&[], chrono_tz::UTC, today), 0);
    }

    #[test]
    fn test_streak_uses_insertion_order_not_date() {
        let tz = chrono_tz::UTC;
        let today = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        let old = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        let recent = Utc.with_ymd_and_hms(2026, 8, 3, 0, 0, 0).unwrap();
        // Front of the slice is the most recent insertion, even if it
        // carries an older date.
        let txs = vec![
            tx(1.0, Category::Food, TxKind::Debit).with_date(old),
            tx(1.0, Category::Food, TxKind::Debit).with_date(recent),
        ];
        assert_eq!(no_spend_streak(&txs, tz, today), 34);
    }

    #[test]
    fn test_weekly_fun_window_and_debits_only() {
        let now = Utc.with_ymd_and_hms(2026, 8, 4, 12, 0, 0).unwrap();
        let in_window = now - Duration::days(2);
        let out_of_window = now - Duration::days(9);

        let txs = vec![
            tx(40.0, Category::Fun, TxKind::Debit).with_date(in_window),
            tx(60.0, Category::Food, TxKind::Debit).with_date(in_window),
            tx(500.0, Category::Fun, TxKind::Credit).with_date(in_window),
            tx(80.0, Category::Fun, TxKind::Debit).with_date(out_of_window),
        ];

        let week = weekly_fun(&txs, now);
        assert_eq!(week.fun_spent, 40.0);
        assert_eq!(week.total_spent, 100.0);
    }

    #[test]
    fn test_goal_strategy_request_remaining_and_debit_cap() {
        let mut goal = SavingsGoal::new("Console", 1000.0);
        goal.current_saved = 400.0;

        let mut txs: Vec<Transaction> = (0..12)
            .map(|i| tx(10.0 + i as f64, Category::Fun, TxKind::Debit))
            .collect();
        txs.push(tx(999.0, Category::Other, TxKind::Credit));

        let req = goal_strategy_request(&goal, &txs);
        assert_eq!(req.remaining, 600.0);
        assert_eq!(req.recent_debits.len(), 10);
        assert!(req.recent_debits.iter().all(|d| d.amount < 999.0));
    }

    #[test]
    fn test_recent_summary_formatting() {
        let txs = vec![
            tx(12.5, Category::Food, TxKind::Debit),
            tx(3.0, Category::Fun, TxKind::Debit),
        ];
        let mut txs = txs;
        txs[0].merchant = "Campus Cafe".to_string();
        txs[1].merchant = "Arcade".to_string();
        assert_eq!(
            recent_summary(&txs, 5),
            "Campus Cafe ($12.50), Arcade ($3.00)"
        );
    }

    #[test]
    fn test_runway_request_carries_full_history() {
        let txs = vec![
            tx(10.0, Category::Food, TxKind::Debit),
            tx(20.0, Category::Other, TxKind::Credit),
        ];
        let req = runway_request(&txs, 750.0);
        assert_eq!(req.balance, 750.0);
        assert_eq!(req.history.len(), 2);
        assert_eq!(req.history[0].kind, "debit");
        assert_eq!(req.history[1].kind, "credit");
    }
}
