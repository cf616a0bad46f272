//! Statement parameter binding for tokio-postgres.

use pgsafe_domain::{DatabaseFailure, ParamType, SqlValue};
use serde_json::Value as JsonValue;
use tokio_postgres::types::{ToSql, Type};

/// Owned parameter ready to be borrowed by `Client::execute`.
pub type BoxedParam = Box<dyn ToSql + Sync + Send>;

/// Wire type for a declared parameter type.
pub fn pg_type(ty: ParamType) -> Type {
    match ty {
        ParamType::Bool => Type::BOOL,
        ParamType::Int2 => Type::INT2,
        ParamType::Int4 => Type::INT4,
        ParamType::Int8 => Type::INT8,
        ParamType::Float4 => Type::FLOAT4,
        ParamType::Float8 => Type::FLOAT8,
        ParamType::Text => Type::TEXT,
        ParamType::Varchar => Type::VARCHAR,
        ParamType::Json => Type::JSON,
        ParamType::Jsonb => Type::JSONB,
    }
}

/// Convert one value to the Rust type tokio-postgres expects for `ty`.
///
/// `position` is 1-based, matching the `$n` placeholder.
///
/// # Errors
/// A client-side [`DatabaseFailure`] when the value cannot be represented as
/// `ty` (wrong kind, or an integer out of range).
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn bind(position: usize, value: &SqlValue, ty: ParamType) -> Result<BoxedParam, DatabaseFailure> {
    let mismatch = || {
        DatabaseFailure::client(format!("parameter ${position}: cannot bind {value:?} as {ty}"))
    };

    let boxed: BoxedParam = match (ty, value) {
        (ParamType::Bool, SqlValue::Null) => Box::new(None::<bool>),
        (ParamType::Bool, SqlValue::Bool(b)) => Box::new(*b),

        (ParamType::Int2, SqlValue::Null) => Box::new(None::<i16>),
        (ParamType::Int2, SqlValue::Int(i)) => Box::new(i16::try_from(*i).map_err(|_| mismatch())?),
        (ParamType::Int4, SqlValue::Null) => Box::new(None::<i32>),
        (ParamType::Int4, SqlValue::Int(i)) => Box::new(i32::try_from(*i).map_err(|_| mismatch())?),
        (ParamType::Int8, SqlValue::Null) => Box::new(None::<i64>),
        (ParamType::Int8, SqlValue::Int(i)) => Box::new(*i),

        (ParamType::Float4, SqlValue::Null) => Box::new(None::<f32>),
        (ParamType::Float4, SqlValue::Float(f)) => Box::new(*f as f32),
        (ParamType::Float8, SqlValue::Null) => Box::new(None::<f64>),
        (ParamType::Float8, SqlValue::Float(f)) => Box::new(*f),
        (ParamType::Float8, SqlValue::Int(i)) => Box::new(*i as f64),

        (ParamType::Text | ParamType::Varchar, SqlValue::Null) => Box::new(None::<String>),
        (ParamType::Text | ParamType::Varchar, SqlValue::Text(s)) => Box::new(s.clone()),

        (ParamType::Json | ParamType::Jsonb, SqlValue::Null) => Box::new(None::<JsonValue>),
        (ParamType::Json | ParamType::Jsonb, other) => Box::new(to_json(other)),

        _ => return Err(mismatch()),
    };

    Ok(boxed)
}

/// Bind every parameter of a statement in order.
///
/// # Errors
/// A client-side failure when the value and type counts differ, otherwise
/// the first value that cannot be bound.
pub fn bind_all(values: &[SqlValue], types: &[ParamType]) -> Result<Vec<BoxedParam>, DatabaseFailure> {
    if values.len() != types.len() {
        return Err(DatabaseFailure::client(format!(
            "statement has {} parameter values but {} type hints",
            values.len(),
            types.len()
        )));
    }

    values
        .iter()
        .zip(types)
        .enumerate()
        .map(|(index, (value, ty))| bind(index + 1, value, *ty))
        .collect()
}

fn to_json(value: &SqlValue) -> JsonValue {
    match value {
        SqlValue::Null => JsonValue::Null,
        SqlValue::Bool(b) => JsonValue::Bool(*b),
        SqlValue::Int(i) => JsonValue::from(*i),
        SqlValue::Float(f) => JsonValue::from(*f),
        SqlValue::Text(s) => JsonValue::String(s.clone()),
        SqlValue::Json(v) => v.clone(),
    }
}
