use anyhow::{Context, Result};
use std::path::Path;

use owlet_core::Transaction;

/// Write the ledger to CSV, newest first, one row per record.
pub fn write_csv(path: &Path, txs: &[Transaction]) -> Result<()> {
    let mut w =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    w.write_record(["id", "date", "merchant", "category", "type", "amount", "origin"])?;

    for t in txs {
        let date = t.date.to_rfc3339();
        let amount = format!("{:.2}", t.amount);
        w.write_record([
            t.id.as_str(),
            date.as_str(),
            t.merchant.as_str(),
            t.category.label(),
            t.kind.label(),
            amount.as_str(),
            t.origin.as_str(),
        ])?;
    }

    w.flush().context("flush csv")?;
    Ok(())
}
