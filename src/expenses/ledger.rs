use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Category, ExpenseError};

/// Amounts strictly above this count as high expenses.
pub const HIGH_EXPENSE_THRESHOLD: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: u64,
    pub description: String,
    pub amount: f64,
    pub currency: String,
    pub category: Category,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub submitted_by: String,
}

impl Expense {
    pub fn is_high(&self) -> bool { self.amount > HIGH_EXPENSE_THRESHOLD }
}

/// Submission form contents before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount: f64,
    pub currency: String,
    pub category: Category,
    pub date: Option<NaiveDate>,
}

impl Default for ExpenseDraft {
    fn default() -> Self {
        Self { description: String::new(), amount: 0.0, currency: "USD".into(), category: Category::default(), date: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmountFilter {
    #[default]
    All,
    High,
    Low,
}

impl AmountFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Some(AmountFilter::All),
            "high" => Some(AmountFilter::High),
            "low" => Some(AmountFilter::Low),
            _ => None,
        }
    }

    pub fn matches(&self, e: &Expense) -> bool {
        match self {
            AmountFilter::All => true,
            AmountFilter::High => e.is_high(),
            AmountFilter::Low => !e.is_high(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ExpenseLedger {
    items: Vec<Expense>,
    next_id: u64,
}

impl ExpenseLedger {
    pub fn new() -> Self { Self { items: Vec::new(), next_id: 1 } }

    pub fn submit(&mut self, draft: ExpenseDraft, submitted_by: &str) -> Result<Expense, ExpenseError> {
        let description = draft.description.trim();
        if description.is_empty() {
            return Err(ExpenseError::InvalidDraft("description is required".into()));
        }
        if !draft.amount.is_finite() || draft.amount <= 0.0 {
            return Err(ExpenseError::InvalidDraft(format!("amount must be positive, got {}", draft.amount)));
        }
        let currency = match draft.currency.trim() {
            "" => "USD".to_string(),
            c => c.to_ascii_uppercase(),
        };
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        let expense = Expense {
            id,
            description: description.to_string(),
            amount: draft.amount,
            currency,
            category: draft.category,
            date: draft.date,
            submitted_by: submitted_by.to_string(),
        };
        tracing::debug!(target: "expensedesk::expenses", "expense.submit id={} amount={} by={}", id, expense.amount, submitted_by);
        self.items.push(expense.clone());
        Ok(expense)
    }

    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|e| e.id != id);
        self.items.len() != before
    }

    pub fn submitted_by<'a>(&'a self, email: &'a str) -> impl Iterator<Item = &'a Expense> + 'a {
        self.items.iter().filter(move |e| e.submitted_by == email)
    }

    /// One submitter's expenses that pass `f`, in submission order.
    pub fn filter_for<'a>(&'a self, email: &'a str, f: AmountFilter) -> Vec<&'a Expense> {
        self.submitted_by(email).filter(|e| f.matches(e)).collect()
    }

    /// Sum of everything `email` submitted, regardless of filter.
    pub fn total_for(&self, email: &str) -> f64 { self.submitted_by(email).map(|e| e.amount).sum() }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }
}
