use std::collections::BTreeMap;

use tracing::debug;

use super::calendar::YearMonth;
use super::error::{Result, require_finite};
use super::stats::{linear_fit, population_std_dev};
use super::types::{Transaction, TransactionPatterns};

#[derive(Default)]
struct Bucket {
    income: f64,
    expenses: f64,
}

/// Buckets transactions by calendar month and summarises the net cash flow.
///
/// Amounts are summed by magnitude; the transaction type alone decides
/// which side of the ledger they land on.
pub fn analyze_transaction_patterns(transactions: &[Transaction]) -> Result<TransactionPatterns> {
    for tx in transactions {
        require_finite("transaction amount", tx.amount)?;
    }
    debug!(
        transactions = transactions.len(),
        "analyzing transaction patterns"
    );

    let mut buckets: BTreeMap<YearMonth, Bucket> = BTreeMap::new();
    for tx in transactions {
        let bucket = buckets.entry(YearMonth::of(tx.date)).or_default();
        if tx.transaction_type.is_inflow() {
            bucket.income += tx.amount.abs();
        } else {
            bucket.expenses += tx.amount.abs();
        }
    }

    let mut patterns = TransactionPatterns::default();
    for (month, bucket) in buckets {
        patterns.months.push(month);
        patterns.monthly_income.push(bucket.income);
        patterns.monthly_expenses.push(bucket.expenses);
        patterns.net_cash_flow.push(bucket.income - bucket.expenses);
    }

    patterns.volatility = if patterns.net_cash_flow.len() < 2 {
        0.0
    } else {
        population_std_dev(&patterns.net_cash_flow)
    };
    patterns.trend = linear_fit(&patterns.net_cash_flow)
        .map(|fit| fit.slope)
        .unwrap_or(0.0);
    Ok(patterns)
}
