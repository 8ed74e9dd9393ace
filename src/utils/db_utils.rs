use sqlx::MySqlPool;

use crate::leave::CalendarDate;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    Date(CalendarDate),
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Column names are `'static` so they can only come from code, never from a
/// request body. Returns `None` when there is nothing to set.
pub fn build_update_sql(
    table: &str,
    columns: Vec<(&'static str, SqlValue)>,
    id_column: &str,
    id_value: u64,
) -> Option<SqlUpdate> {
    if columns.is_empty() {
        return None;
    }

    let set_clause = columns
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values: Vec<SqlValue> = columns.into_iter().map(|(_, value)| value).collect();
    values.push(SqlValue::I64(id_value as i64));

    Some(SqlUpdate { sql, values })
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
            SqlValue::Date(v) => query.bind(v),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_set_clause_in_order() {
        let update = build_update_sql(
            "holiday_periods",
            vec![
                ("name", SqlValue::String("Winter break".into())),
                (
                    "end_date",
                    SqlValue::Date(CalendarDate::parse("2025-01-03").unwrap()),
                ),
            ],
            "id",
            9,
        )
        .unwrap();

        assert_eq!(
            update.sql,
            "UPDATE holiday_periods SET name = ?, end_date = ? WHERE id = ?"
        );
        assert_eq!(update.values.len(), 3);
        assert_eq!(update.values[2], SqlValue::I64(9));
    }

    #[test]
    fn nothing_to_update() {
        assert!(build_update_sql("holiday_periods", vec![], "id", 1).is_none());
    }
}
