//! Rotation cursor for round-robin assignment.
//!
//! The cursor is a singleton row recording the index of the last agent
//! assigned. It is advanced with a single increment-and-fetch statement;
//! SQLite's per-statement atomicity guarantees two concurrent callers can
//! never observe the same pre-increment value. Never read the cursor and
//! write it back in separate statements.

use sqlx::SqlitePool;

use crate::error::Result;

/// Advance the cursor and return the index to assign.
///
/// The first call ever creates the cursor at index 0; every later call
/// computes `(last + 1) % roster_len`. The modulus is taken against the
/// *current* roster size, so a shrunken roster can skip or repeat agents
/// relative to the full history but the returned index is always in
/// bounds.
pub async fn advance_cursor(pool: &SqlitePool, roster_len: i64) -> Result<i64> {
    let index = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO rotation_cursor (id, last_index)
        VALUES (0, 0)
        ON CONFLICT(id) DO UPDATE SET
            last_index = (rotation_cursor.last_index + 1) % ?
        RETURNING last_index
        "#,
    )
    .bind(roster_len)
    .fetch_one(pool)
    .await?;

    Ok(index)
}

/// Read the cursor without advancing it. `None` until the first assignment.
pub async fn get_cursor(pool: &SqlitePool) -> Result<Option<i64>> {
    let index = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT last_index FROM rotation_cursor WHERE id = 0
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(index)
}
