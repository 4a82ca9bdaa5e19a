use crate::error::ApiError;
use serde_json::Value;
use sqlx::MySqlPool;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Null,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Builds a partial `UPDATE` from a JSON object.
///
/// Only keys listed in `allowed` become columns; unknown keys are ignored so
/// a client can never name a column it does not own. Fails when nothing
/// updatable remains.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed: &[&str],
    id_column: &str,
    id_value: SqlValue,
) -> Result<SqlUpdate, ApiError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ApiError::bad_request("Payload must be a JSON object"))?;

    let mut columns = Vec::new();
    let mut values = Vec::new();

    // Iterate the whitelist, not the payload, for a stable column order.
    for column in allowed {
        let Some(value) = obj.get(*column) else {
            continue;
        };
        let bound = match value {
            Value::String(s) => SqlValue::String(s.clone()),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => SqlValue::I64(i),
                (None, Some(f)) => SqlValue::F64(f),
                _ => return Err(ApiError::bad_request(format!("Unsupported number for {column}"))),
            },
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Null => SqlValue::Null,
            _ => return Err(ApiError::bad_request(format!("Unsupported value for {column}"))),
        };
        columns.push(format!("{column} = ?"));
        values.push(bound);
    }

    if columns.is_empty() {
        return Err(ApiError::bad_request("No valid update fields provided"));
    }

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table,
        columns.join(", "),
        id_column
    );

    // WHERE id = ?
    values.push(id_value);

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

/// Page/per_page normalisation shared by list endpoints.
/// The offset is widened to `u64` so no `page` value can overflow it.
pub fn page_window(page: Option<u32>, per_page: Option<u32>) -> (u32, u32, u64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(20).clamp(1, 100);
    let offset = u64::from(page - 1) * u64::from(per_page);
    (page, per_page, offset)
}
