//! Expense ledger, approvals queue and the currency helper. These are thin
//! in-process state holders; nothing here talks to a backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod ledger;
mod approvals;
mod currency;

pub use ledger::{Expense, ExpenseDraft, ExpenseLedger, AmountFilter, HIGH_EXPENSE_THRESHOLD};
pub use approvals::{ApprovalItem, ApprovalQueue, ApprovalStatus};
pub use currency::{convert_amount, parse_rates, RateTable};

#[derive(Debug, Error, PartialEq)]
pub enum ExpenseError {
    #[error("invalid expense: {0}")]
    InvalidDraft(String),
    #[error("no item with id {0}")]
    NotFound(u64),
    #[error("item {id} is already {status}")]
    AlreadyDecided { id: u64, status: ApprovalStatus },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Travel,
    Meals,
    Accommodation,
    #[serde(rename = "Office Supplies")]
    OfficeSupplies,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Travel, Category::Meals, Category::Accommodation, Category::OfficeSupplies];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Travel => "Travel",
            Category::Meals => "Meals",
            Category::Accommodation => "Accommodation",
            Category::OfficeSupplies => "Office Supplies",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl FromStr for Category {
    type Err = ExpenseError;

    /// Case-insensitive; spaces, dashes and underscores are ignored so
    /// `office-supplies` and `OfficeSupplies` both work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.chars().filter(|c| !matches!(c, ' ' | '-' | '_')).collect::<String>().to_ascii_lowercase();
        match key.as_str() {
            "travel" => Ok(Category::Travel),
            "meals" => Ok(Category::Meals),
            "accommodation" => Ok(Category::Accommodation),
            "officesupplies" => Ok(Category::OfficeSupplies),
            _ => Err(ExpenseError::InvalidDraft(format!("unknown category '{}'", s))),
        }
    }
}
