//! # Expense Repository
//!
//! Database operations for expenses: cash paid out of the till.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use pharmapos_core::report::LedgerEntry;
use pharmapos_core::{Expense, NewExpense};

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Inserts an expense and returns its ID.
    pub async fn insert(&self, expense: &NewExpense, spent_at: DateTime<Utc>) -> DbResult<i64> {
        debug!(particulars = %expense.particulars, amount = expense.amount, "Inserting expense");

        let result = sqlx::query(
            r#"
            INSERT INTO expenses (spent_at, particulars, method, amount, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(spent_at)
        .bind(expense.particulars.trim())
        .bind(expense.method.as_deref())
        .bind(expense.amount)
        .bind(expense.notes.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Gets an expense by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(
            "SELECT id, spent_at, particulars, method, amount, notes FROM expenses WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Expenses in `[from, until)` as ledger entries.
    pub async fn ledger_entries(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT
                id,
                spent_at AS time,
                'EXPENSE' AS kind,
                particulars,
                amount
            FROM expenses
            WHERE spent_at >= ?1 AND spent_at < ?2
            ORDER BY spent_at, id
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
