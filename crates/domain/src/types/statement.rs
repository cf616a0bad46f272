//! Statements produced by the authoring surface and consumed by dispatchers.

use serde::{Deserialize, Serialize};

use crate::errors::AuthoringError;
use crate::impl_domain_str_conversions;

/// A positional parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(serde_json::Value),
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// PostgreSQL type hint sent alongside a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Text,
    Varchar,
    Json,
    Jsonb,
}

impl_domain_str_conversions!(ParamType {
    Bool => "bool",
    Int2 => "int2",
    Int4 => "int4",
    Int8 => "int8",
    Float4 => "float4",
    Float8 => "float8",
    Text => "text",
    Varchar => "varchar",
    Json => "json",
    Jsonb => "jsonb",
});

impl ParamType {
    /// Default hint for a value when the caller does not give one.
    ///
    /// `NULL` is sent as `text`; the server coerces it to the column type.
    pub fn infer(value: &SqlValue) -> Self {
        match value {
            SqlValue::Bool(_) => Self::Bool,
            SqlValue::Int(_) => Self::Int8,
            SqlValue::Float(_) => Self::Float8,
            SqlValue::Null | SqlValue::Text(_) => Self::Text,
            SqlValue::Json(_) => Self::Jsonb,
        }
    }
}

/// One SQL statement with its parameters.
///
/// Built once and never mutated afterwards: the builder methods consume the
/// statement and all accessors borrow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StatementFields")]
pub struct Statement {
    sql: String,
    #[serde(default)]
    params: Vec<SqlValue>,
    #[serde(default)]
    param_types: Vec<ParamType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
}

/// Wire shape of [`Statement`], checked by `with_params` on the way in.
#[derive(Deserialize)]
struct StatementFields {
    sql: String,
    #[serde(default)]
    params: Vec<SqlValue>,
    #[serde(default)]
    param_types: Vec<ParamType>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl TryFrom<StatementFields> for Statement {
    type Error = AuthoringError;

    fn try_from(fields: StatementFields) -> Result<Self, Self::Error> {
        let statement = Self::with_params(fields.sql, fields.params, fields.param_types)?;
        Ok(Self { timeout_secs: fields.timeout_secs, ..statement })
    }
}

impl Statement {
    /// Statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into(), params: Vec::new(), param_types: Vec::new(), timeout_secs: None }
    }

    /// Statement with explicit parameter values and one type hint per value.
    ///
    /// # Errors
    /// Returns [`AuthoringError::ParameterMismatch`] when the two lists differ
    /// in length.
    pub fn with_params(
        sql: impl Into<String>,
        params: Vec<SqlValue>,
        param_types: Vec<ParamType>,
    ) -> Result<Self, AuthoringError> {
        if params.len() != param_types.len() {
            return Err(AuthoringError::ParameterMismatch {
                values: params.len(),
                types: param_types.len(),
            });
        }

        Ok(Self { sql: sql.into(), params, param_types, timeout_secs: None })
    }

    /// Append a parameter, inferring its type hint.
    #[must_use]
    pub fn bind(self, value: impl Into<SqlValue>) -> Self {
        let value = value.into();
        let ty = ParamType::infer(&value);
        self.bind_typed(value, ty)
    }

    /// Append a parameter with an explicit type hint.
    #[must_use]
    pub fn bind_typed(mut self, value: impl Into<SqlValue>, ty: ParamType) -> Self {
        self.params.push(value.into());
        self.param_types.push(ty);
        self
    }

    /// Override the server-side statement timeout for this statement only.
    #[must_use]
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    pub fn param_types(&self) -> &[ParamType] {
        &self.param_types
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }

    /// Copy of this statement without its timeout override.
    pub(crate) fn without_timeout(&self) -> Self {
        Self { timeout_secs: None, ..self.clone() }
    }

    /// Expand the timeout override into explicit session statements.
    ///
    /// A statement with a timeout becomes
    /// `SET statement_timeout`, the statement itself, `RESET statement_timeout`.
    /// A statement without one is returned as is.
    pub fn bracketed(&self) -> Vec<Self> {
        match self.timeout_secs {
            Some(secs) => vec![
                Self::new(format!("SET statement_timeout TO '{secs}s'")),
                self.without_timeout(),
                Self::new("RESET statement_timeout"),
            ],
            None => vec![self.clone()],
        }
    }
}
