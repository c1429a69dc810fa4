//! # Expense Book
//!
//! Records cash paid out of the till so the daily ledger can net it
//! against sales.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::ServiceResult;
use crate::repository::expense::ExpenseRepository;
use pharmapos_core::validation::validate_new_expense;
use pharmapos_core::{Expense, NewExpense};

#[derive(Debug, Clone)]
pub struct ExpenseBook {
    expenses: ExpenseRepository,
}

impl ExpenseBook {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            expenses: ExpenseRepository::new(pool),
        }
    }

    /// Records an expense now and returns its ID.
    pub async fn record_expense(&self, expense: &NewExpense) -> ServiceResult<i64> {
        self.record_expense_at(expense, Utc::now()).await
    }

    pub async fn record_expense_at(
        &self,
        expense: &NewExpense,
        spent_at: DateTime<Utc>,
    ) -> ServiceResult<i64> {
        validate_new_expense(expense)?;
        let id = self.expenses.insert(expense, spent_at).await?;

        info!(expense_id = id, amount = expense.amount, "Expense recorded");
        Ok(id)
    }

    pub async fn get_expense(&self, id: i64) -> ServiceResult<Option<Expense>> {
        Ok(self.expenses.get_by_id(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::service::test_support::*;
    use pharmapos_core::CoreError;

    #[tokio::test]
    async fn test_record_expense() {
        let db = test_db().await;
        let expense = NewExpense {
            particulars: " Shop rent ".to_string(),
            amount: 300_000,
            method: Some("KPAY".to_string()),
            notes: Some("October".to_string()),
        };

        let id = db.expense_book().record_expense_at(&expense, now()).await.unwrap();
        let stored = db.expense_book().get_expense(id).await.unwrap().unwrap();

        assert_eq!(stored.particulars, "Shop rent");
        assert_eq!(stored.amount, 300_000);
        assert_eq!(stored.method.as_deref(), Some("KPAY"));
        assert_eq!(stored.notes.as_deref(), Some("October"));
        assert_eq!(stored.spent_at, now());
    }

    #[tokio::test]
    async fn test_expense_needs_amount() {
        let db = test_db().await;
        let expense = NewExpense {
            particulars: "Tea".to_string(),
            amount: 0,
            method: None,
            notes: None,
        };

        let err = db.expense_book().record_expense(&expense).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::Validation(_))));
    }
}
