use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

pub fn transactions_path(member: &str) -> String {
    format!("family/{}/finances/transactions.json", member)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ApiError::bad_request("amount must be a non-negative number"));
        }
        if self.category.trim().is_empty() {
            return Err(ApiError::required_field("category"));
        }
        Ok(())
    }

    /// Amount with the sign implied by its kind
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    pub count: usize,
    /// Net amount per category (expenses negative)
    pub by_category: BTreeMap<String, f64>,
}

impl FinanceSummary {
    /// Totals over `transactions`, optionally restricted to one `YYYY-MM` month
    pub fn from_transactions(transactions: &[Transaction], month: Option<&str>) -> Self {
        let mut summary = FinanceSummary::default();

        for tx in transactions
            .iter()
            .filter(|tx| month.map_or(true, |m| tx.date.starts_with(m)))
        {
            match tx.kind {
                TransactionKind::Income => summary.income += tx.amount,
                TransactionKind::Expense => summary.expense += tx.amount,
            }
            *summary.by_category.entry(tx.category.clone()).or_insert(0.0) += tx.signed_amount();
            summary.count += 1;
        }

        summary.balance = summary.income - summary.expense;
        summary
    }
}
