use std::str::FromStr;

use quote_core::RepositoryError;
use rust_decimal::Decimal;
use sqlx::{Row, TypeInfo, ValueRef};

/// Get a decimal value from a row.
///
/// Money and hours are stored as TEXT so they survive exactly; INTEGER and
/// REAL are accepted for rows written by hand. NULL reads as zero.
pub fn get_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(Decimal::ZERO);
    }

    let type_info = value_ref.type_info();
    let type_name = type_info.name();

    match type_name {
        "TEXT" => {
            let val: String = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get TEXT from '{}': {}", column, e))
            })?;
            Decimal::from_str(val.trim()).map_err(|e| {
                RepositoryError::Database(format!(
                    "Invalid decimal '{}' in column '{}': {}",
                    val, column, e
                ))
            })
        }
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to get INTEGER from '{}': {}",
                    column, e
                ))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Get an optional decimal value from a row, returning None for NULL values.
pub fn get_optional_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(None);
    }

    get_decimal(row, column).map(Some)
}

/// Text form of a decimal for storage. Keeps the scale, so `712.80` stays
/// `712.80`.
pub fn decimal_to_text(d: Decimal) -> String {
    d.to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> sqlx::sqlite::SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query(
            "CREATE TABLE test_decimals (
                id INTEGER PRIMARY KEY,
                text_value TEXT,
                int_value INTEGER,
                real_value REAL,
                blob_value BLOB
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");
        pool
    }

    async fn fetch(
        pool: &sqlx::sqlite::SqlitePool,
        insert: &str,
    ) -> sqlx::sqlite::SqliteRow {
        sqlx::query(insert)
            .execute(pool)
            .await
            .expect("Failed to insert test data");
        sqlx::query("SELECT * FROM test_decimals WHERE id = 1")
            .fetch_one(pool)
            .await
            .expect("Failed to fetch row")
    }

    // get_decimal tests

    #[tokio::test]
    async fn test_get_decimal_from_text_is_exact() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO test_decimals (id, text_value) VALUES (1, '1216.99')").await;

        assert_eq!(get_decimal(&row, "text_value"), Ok(dec!(1216.99)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_integer() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO test_decimals (id, int_value) VALUES (1, 132)").await;

        assert_eq!(get_decimal(&row, "int_value"), Ok(dec!(132)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_real() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO test_decimals (id, real_value) VALUES (1, 46.5)").await;

        assert_eq!(get_decimal(&row, "real_value"), Ok(dec!(46.5)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_null_returns_zero() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO test_decimals (id) VALUES (1)").await;

        assert_eq!(get_decimal(&row, "text_value"), Ok(Decimal::ZERO));
    }

    #[tokio::test]
    async fn test_get_decimal_rejects_non_numeric_text() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO test_decimals (id, text_value) VALUES (1, 'abc')").await;

        let result = get_decimal(&row, "text_value");

        assert!(matches!(
            result,
            Err(RepositoryError::Database(msg)) if msg.starts_with("Invalid decimal 'abc' in column 'text_value'")
        ));
    }

    #[tokio::test]
    async fn test_get_decimal_unexpected_type() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO test_decimals (id, blob_value) VALUES (1, x'00')").await;

        assert_eq!(
            get_decimal(&row, "blob_value"),
            Err(RepositoryError::Database(
                "Unexpected type 'BLOB' for column 'blob_value'".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_get_decimal_column_not_found() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO test_decimals (id) VALUES (1)").await;

        let result = get_decimal(&row, "nonexistent_column");

        assert!(matches!(
            result,
            Err(RepositoryError::Database(msg)) if msg.starts_with("Column 'nonexistent_column' not found:")
        ));
    }

    // get_optional_decimal tests

    #[tokio::test]
    async fn test_get_optional_decimal_from_text() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO test_decimals (id, text_value) VALUES (1, '0.1025')").await;

        assert_eq!(get_optional_decimal(&row, "text_value"), Ok(Some(dec!(0.1025))));
    }

    #[tokio::test]
    async fn test_get_optional_decimal_from_null_returns_none() {
        let pool = setup_test_db().await;
        let row = fetch(&pool, "INSERT INTO test_decimals (id) VALUES (1)").await;

        assert_eq!(get_optional_decimal(&row, "text_value"), Ok(None));
    }

    // decimal_to_text tests

    #[test]
    fn test_decimal_to_text_keeps_scale() {
        assert_eq!(decimal_to_text(dec!(712.80)), "712.80");
        assert_eq!(decimal_to_text(dec!(0.075)), "0.075");
        assert_eq!(decimal_to_text(Decimal::ZERO), "0");
    }
}
