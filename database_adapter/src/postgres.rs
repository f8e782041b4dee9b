use sqlx::{Pool, Postgres, postgres::PgPoolOptions};

use crate::db::{DbError, SlotStore};

/// Slot store backed by a Postgres table, one row per slot
#[derive(Clone)]
pub struct PostgresSlotStore {
    pool: Pool<Postgres>,
    table: String,
}

impl std::fmt::Debug for PostgresSlotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresSlotStore")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl PostgresSlotStore {
    /// Connect to the database and make sure the slot table exists
    /// # Errors
    /// - Returns `DbError` if the connection or the table creation fails
    pub async fn connect(db_url: &str, table: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new().connect(db_url).await?;

        let query = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )"
        );
        sqlx::query(&query).execute(&pool).await?;

        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }
}

impl SlotStore for PostgresSlotStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        let query = format!("SELECT value FROM {} WHERE key = $1", self.table);

        let value: Option<String> = sqlx::query_scalar(&query)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        let query = format!(
            "INSERT INTO {} (key, value) VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
            self.table
        );

        sqlx::query(&query)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DbError> {
        let query = format!("DELETE FROM {} WHERE key = $1", self.table);

        sqlx::query(&query)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
