//! Conversions between bound values, PostgreSQL parameters and JSON rows.

use serde_json::{Number, Value};
use tokio_postgres::Row;
use tokio_postgres::types::{ToSql, Type};

use crate::error::{BackendError, StorageError, StorageResult};
use crate::query::SqlParam;

/// Boxes bound values as PostgreSQL parameters.
pub(crate) fn to_sql_params(values: &[SqlParam]) -> Vec<Box<dyn ToSql + Sync + Send>> {
    values
        .iter()
        .map(|value| -> Box<dyn ToSql + Sync + Send> {
            match value {
                SqlParam::Text(s) => Box::new(s.clone()),
                SqlParam::TextArray(v) => Box::new(v.clone()),
                SqlParam::Integer(n) => Box::new(*n),
                SqlParam::IntegerArray(v) => Box::new(v.clone()),
            }
        })
        .collect()
}

/// Borrows boxed parameters in the form `query` expects.
pub(crate) fn param_refs(params: &[Box<dyn ToSql + Sync + Send>]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|p| p.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

/// Reads a row as a JSON array of its columns, in order.
pub(crate) fn row_to_array(row: &Row) -> StorageResult<Value> {
    (0..row.len())
        .map(|idx| column_to_json(row, idx))
        .collect::<StorageResult<Vec<_>>>()
        .map(Value::Array)
}

fn column_to_json(row: &Row, idx: usize) -> StorageResult<Value> {
    let ty = row.columns()[idx].type_();

    let value = if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)?.map(Value::from)
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)?.map(Value::from)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)?.map(Value::from)
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)?
            .and_then(Number::from_f64)
            .map(Value::Number)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)?
            .and_then(|f| Number::from_f64(f64::from(f)))
            .map(Value::Number)
    } else if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)?.map(Value::Bool)
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        row.try_get::<_, Option<Value>>(idx)?
    } else if *ty == Type::TEXT_ARRAY || *ty == Type::VARCHAR_ARRAY {
        row.try_get::<_, Option<Vec<String>>>(idx)?
            .map(|v| Value::Array(v.into_iter().map(Value::String).collect()))
    } else {
        // TEXT, VARCHAR, BPCHAR, NAME and anything else with a text form
        match row.try_get::<_, Option<String>>(idx) {
            Ok(v) => v.map(Value::String),
            Err(_) => {
                return Err(StorageError::Backend(BackendError::SerializationError {
                    message: format!(
                        "unsupported column type {} for column '{}'",
                        ty,
                        row.columns()[idx].name()
                    ),
                }));
            }
        }
    };

    Ok(value.unwrap_or(Value::Null))
}
