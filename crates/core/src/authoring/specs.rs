//! Index and foreign-key definitions accepted by the schema helpers.

use serde::{Deserialize, Serialize};

/// A concurrently built index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    pub table: String,
    /// Column names or expressions, emitted verbatim.
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    /// Access method (`btree`, `gin`, ...). The server default when `None`.
    #[serde(default)]
    pub using: Option<String>,
    /// Partial index predicate.
    #[serde(default, rename = "where")]
    pub predicate: Option<String>,
}

impl IndexSpec {
    pub fn new<I, S>(name: impl Into<String>, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
            using: None,
            predicate: None,
        }
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn using(mut self, method: impl Into<String>) -> Self {
        self.using = Some(method.into());
        self
    }

    #[must_use]
    pub fn predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub(crate) fn to_sql(&self) -> String {
        let mut sql = String::from("CREATE ");
        if self.unique {
            sql.push_str("UNIQUE ");
        }
        sql.push_str("INDEX CONCURRENTLY IF NOT EXISTS ");
        sql.push_str(&self.name);
        sql.push_str(" ON ");
        sql.push_str(&self.table);
        if let Some(method) = &self.using {
            sql.push_str(" USING ");
            sql.push_str(method);
        }
        sql.push_str(" (");
        sql.push_str(&self.columns.join(", "));
        sql.push(')');
        if let Some(predicate) = &self.predicate {
            sql.push_str(" WHERE ");
            sql.push_str(predicate);
        }
        sql
    }
}

/// A foreign key added as `NOT VALID` and validated in a second statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeySpec {
    /// Constraint name.
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub references_table: String,
    pub references_columns: Vec<String>,
    /// `CASCADE`, `SET NULL`, `RESTRICT`, ...
    #[serde(default)]
    pub on_delete: Option<String>,
}

impl ForeignKeySpec {
    pub fn new<I, S, J, T>(
        name: impl Into<String>,
        table: impl Into<String>,
        columns: I,
        references_table: impl Into<String>,
        references_columns: J,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            references_table: references_table.into(),
            references_columns: references_columns.into_iter().map(Into::into).collect(),
            on_delete: None,
        }
    }

    #[must_use]
    pub fn on_delete(mut self, action: impl Into<String>) -> Self {
        self.on_delete = Some(action.into());
        self
    }

    pub(crate) fn add_sql(&self) -> String {
        let mut sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.table,
            self.name,
            self.columns.join(", "),
            self.references_table,
            self.references_columns.join(", "),
        );
        if let Some(action) = &self.on_delete {
            sql.push_str(" ON DELETE ");
            sql.push_str(action);
        }
        sql.push_str(" NOT VALID");
        sql
    }

    pub(crate) fn validate_sql(&self) -> String {
        format!("ALTER TABLE {} VALIDATE CONSTRAINT {}", self.table, self.name)
    }
}
