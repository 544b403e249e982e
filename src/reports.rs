//! Sales summary for the Reports screen, computed from a transaction list.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{PaymentMethod, Transaction, TransactionStatus};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MethodTotals {
    pub count: usize,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesSummary {
    /// Completed sales only.
    pub completed_count: usize,
    pub total_amount: f64,
    pub total_liters: f64,
    pub by_method: BTreeMap<&'static str, MethodTotals>,
    pub by_status: BTreeMap<&'static str, usize>,
}

impl SalesSummary {
    pub fn average_sale(&self) -> Option<f64> {
        (self.completed_count > 0).then(|| self.total_amount / self.completed_count as f64)
    }

    pub fn method(&self, method: PaymentMethod) -> MethodTotals {
        self.by_method
            .get(method.as_str())
            .cloned()
            .unwrap_or_default()
    }
}

/// Summarise transactions. Amounts and liters count completed sales only;
/// the status breakdown counts everything.
pub fn summarize<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> SalesSummary {
    let mut summary = SalesSummary::default();
    for tx in transactions {
        *summary.by_status.entry(tx.status.as_str()).or_default() += 1;
        if tx.status != TransactionStatus::Completed {
            continue;
        }
        summary.completed_count += 1;
        summary.total_amount += tx.total_amount;
        summary.total_liters += tx.fuel_amount;
        let entry = summary
            .by_method
            .entry(tx.payment_method.as_str())
            .or_default();
        entry.count += 1;
        entry.amount += tx.total_amount;
    }
    summary
}
