//! Firmware size validation against the board budget.

use serde::Serialize;

/// Outcome of comparing an artifact against its size budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeCheck {
    pub size_bytes: u64,

    /// `None` when the board has no known budget.
    pub budget_bytes: Option<u64>,
}

impl SizeCheck {
    pub fn new(size_bytes: u64, budget_bytes: Option<u64>) -> Self {
        Self {
            size_bytes,
            budget_bytes,
        }
    }

    /// True only when a budget is known and exceeded.
    pub fn exceeds_budget(&self) -> bool {
        self.budget_bytes
            .map(|budget| self.size_bytes > budget)
            .unwrap_or(false)
    }

    pub fn is_checked(&self) -> bool {
        self.budget_bytes.is_some()
    }

    /// Size as a percentage of the budget, rounded to the nearest integer.
    pub fn percent_of_budget(&self) -> Option<u64> {
        match self.budget_bytes {
            Some(budget) if budget > 0 => {
                let (size, budget) = (u128::from(self.size_bytes), u128::from(budget));
                Some(u64::try_from((size * 100 + budget / 2) / budget).unwrap_or(u64::MAX))
            }
            _ => None,
        }
    }

    pub fn size_kib(&self) -> u64 {
        self.size_bytes / 1024
    }

    /// One-line report, e.g. `Firmware size: 412KB (81%)`.
    pub fn describe(&self) -> String {
        match self.percent_of_budget() {
            Some(pct) => format!("Firmware size: {}KB ({}%)", self.size_kib(), pct),
            None => format!("Firmware size: {}KB", self.size_kib()),
        }
    }
}
