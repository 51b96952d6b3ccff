//! Database schema management for the PostgreSQL store backend.
//!
//! Applied once on startup from `main.rs`, only when `PLANT_STORE=postgres`.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create the `kv_store` table (idempotent).
///
/// One row per record key (`connected_plant_care_plants`, ...), holding the
/// JSON document as text. Safe to call on every startup.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv_store (
            key        TEXT        PRIMARY KEY,
            value      TEXT        NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
