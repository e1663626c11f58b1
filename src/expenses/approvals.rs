use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Category, ExpenseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApprovalStatus::Pending => "Pending",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Rejected => "Rejected",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalItem {
    pub id: u64,
    pub employee: String,
    pub amount: f64,
    pub currency: String,
    pub category: Category,
    pub date: NaiveDate,
    pub status: ApprovalStatus,
}

#[derive(Debug, Default)]
pub struct ApprovalQueue {
    items: Vec<ApprovalItem>,
}

impl ApprovalQueue {
    pub fn new(items: Vec<ApprovalItem>) -> Self { Self { items } }

    /// The two pending claims the manager view starts with.
    pub fn sample() -> Self {
        let item = |id: u64, amount: f64, category: Category, (y, m, d): (i32, u32, u32)| ApprovalItem {
            id,
            employee: "Employee One".into(),
            amount,
            currency: "USD".into(),
            category,
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
            status: ApprovalStatus::Pending,
        };
        Self::new(vec![
            item(1, 120.5, Category::Meals, (2025, 9, 28)),
            item(2, 560.0, Category::Travel, (2025, 9, 25)),
        ])
    }

    pub fn items(&self) -> &[ApprovalItem] { &self.items }

    pub fn get(&self, id: u64) -> Option<&ApprovalItem> { self.items.iter().find(|i| i.id == id) }

    pub fn pending(&self) -> impl Iterator<Item = &ApprovalItem> {
        self.items.iter().filter(|i| i.status == ApprovalStatus::Pending)
    }

    pub fn approve(&mut self, id: u64) -> Result<&ApprovalItem, ExpenseError> {
        self.decide(id, ApprovalStatus::Approved)
    }

    pub fn reject(&mut self, id: u64) -> Result<&ApprovalItem, ExpenseError> {
        self.decide(id, ApprovalStatus::Rejected)
    }

    fn decide(&mut self, id: u64, status: ApprovalStatus) -> Result<&ApprovalItem, ExpenseError> {
        let item = self.items.iter_mut().find(|i| i.id == id).ok_or(ExpenseError::NotFound(id))?;
        if item.status != ApprovalStatus::Pending {
            return Err(ExpenseError::AlreadyDecided { id, status: item.status });
        }
        item.status = status;
        tracing::info!(target: "expensedesk::expenses", "approval.decide id={} status={}", id, status);
        Ok(item)
    }
}
