//! Migration script builder

use pgsafe_domain::{AuthoringError, Statement};

use super::specs::{ForeignKeySpec, IndexSpec};
use super::validation::{
    base_name, ensure_no_inline_foreign_key, validate_identifier, validate_index_name,
    validate_qualified,
};

/// Result of a schema helper, chainable with `?`.
pub type AuthoringResult<'a> = Result<&'a mut MigrationScript, AuthoringError>;

/// Ordered list of statements making up one migration.
///
/// Helpers validate their input first and append nothing on error, so a
/// failed call leaves the script as it was.
///
/// ```
/// use pgsafe_core::{IndexSpec, MigrationScript};
///
/// # fn main() -> Result<(), pgsafe_domain::AuthoringError> {
/// let mut script = MigrationScript::new("add_user_email").with_lock_timeout(5);
/// script
///     .add_column("users", "email", "text")?
///     .add_index(IndexSpec::new("users_email_idx", "users", ["email"]))?;
///
/// assert_eq!(script.statements().len(), 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationScript {
    name: String,
    lock_timeout_secs: Option<u64>,
    statements: Vec<Statement>,
}

impl MigrationScript {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), lock_timeout_secs: None, statements: Vec::new() }
    }

    /// Fail blocked statements with `55P03` after `secs` instead of queueing
    /// behind other sessions' locks.
    #[must_use]
    pub fn with_lock_timeout(mut self, secs: u64) -> Self {
        self.lock_timeout_secs = Some(secs);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lock_timeout_secs(&self) -> Option<u64> {
        self.lock_timeout_secs
    }

    /// Number of authored statements, before timeout expansion.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Statements in dispatch order.
    ///
    /// The lock-timeout prologue comes first; statements carrying a timeout
    /// override are bracketed by `SET`/`RESET statement_timeout`.
    pub fn statements(&self) -> Vec<Statement> {
        let prologue = self
            .lock_timeout_secs
            .map(|secs| Statement::new(format!("SET lock_timeout TO '{secs}s'")));

        prologue
            .into_iter()
            .chain(self.statements.iter().flat_map(Statement::bracketed))
            .collect()
    }

    /// Append a caller-built statement. This is the supported path for data
    /// changes and anything the helpers do not cover.
    pub fn execute(&mut self, statement: Statement) -> &mut Self {
        self.statements.push(statement);
        self
    }

    /// Raw SQL text is not accepted.
    ///
    /// # Errors
    /// Always returns [`AuthoringError::ForbiddenRawStatementUsage`].
    pub fn add_sql(&mut self, sql: impl Into<String>) -> AuthoringResult<'_> {
        Err(AuthoringError::ForbiddenRawStatementUsage { sql: sql.into() })
    }

    /// Run `build` and give every statement it appends the timeout override.
    ///
    /// # Errors
    /// Whatever `build` returns; statements it appended before failing are
    /// removed.
    pub fn with_statement_timeout<F>(&mut self, secs: u64, build: F) -> AuthoringResult<'_>
    where
        F: FnOnce(&mut Self) -> Result<&mut Self, AuthoringError>,
    {
        let start = self.statements.len();
        if let Err(err) = build(self).map(|_| ()) {
            self.statements.truncate(start);
            return Err(err);
        }

        for statement in &mut self.statements[start..] {
            *statement = statement.clone().with_timeout(secs);
        }
        Ok(self)
    }

    /// # Errors
    /// Invalid table name, empty column list, or an inline foreign key.
    pub fn create_table<S: AsRef<str>>(&mut self, table: &str, columns: &[S]) -> AuthoringResult<'_> {
        validate_qualified("table", table)?;
        if columns.is_empty() {
            return Err(AuthoringError::EmptyColumnList { context: format!("table `{table}`") });
        }
        ensure_no_inline_foreign_key(table, columns)?;

        let definitions: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
        Ok(self.push(format!("CREATE TABLE IF NOT EXISTS {table} ({})", definitions.join(", "))))
    }

    /// # Errors
    /// Invalid table name.
    pub fn drop_table(&mut self, table: &str) -> AuthoringResult<'_> {
        validate_qualified("table", table)?;
        Ok(self.push(format!("DROP TABLE IF EXISTS {table}")))
    }

    /// Add a nullable column without a default; set defaults and NOT NULL with
    /// the dedicated helpers.
    ///
    /// # Errors
    /// Invalid table or column name.
    pub fn add_column(&mut self, table: &str, column: &str, data_type: &str) -> AuthoringResult<'_> {
        validate_qualified("table", table)?;
        validate_identifier("column", column)?;
        Ok(self.push(format!("ALTER TABLE {table} ADD COLUMN IF NOT EXISTS {column} {data_type}")))
    }

    /// # Errors
    /// Invalid table or column name.
    pub fn drop_column(&mut self, table: &str, column: &str) -> AuthoringResult<'_> {
        validate_qualified("table", table)?;
        validate_identifier("column", column)?;
        Ok(self.push(format!("ALTER TABLE {table} DROP COLUMN IF EXISTS {column}")))
    }

    /// # Errors
    /// Index name over 63 bytes, invalid table name, or no columns.
    pub fn add_index(&mut self, spec: IndexSpec) -> AuthoringResult<'_> {
        validate_index_name(&spec.name)?;
        validate_qualified("table", &spec.table)?;
        if spec.columns.is_empty() {
            return Err(AuthoringError::EmptyColumnList {
                context: format!("index `{}`", spec.name),
            });
        }
        Ok(self.push(spec.to_sql()))
    }

    /// # Errors
    /// Invalid index name.
    pub fn drop_index(&mut self, name: &str) -> AuthoringResult<'_> {
        validate_qualified("index", name)?;
        Ok(self.push(format!("DROP INDEX CONCURRENTLY IF EXISTS {name}")))
    }

    /// # Errors
    /// Either name invalid; the new name must fit in 63 bytes.
    pub fn rename_index(&mut self, from: &str, to: &str) -> AuthoringResult<'_> {
        validate_qualified("index", from)?;
        validate_index_name(to)?;
        Ok(self.push(format!("ALTER INDEX IF EXISTS {from} RENAME TO {to}")))
    }

    /// Two statements: add the constraint `NOT VALID`, then validate it.
    ///
    /// # Errors
    /// Invalid names or empty column lists.
    pub fn add_foreign_key(&mut self, spec: ForeignKeySpec) -> AuthoringResult<'_> {
        validate_identifier("constraint", &spec.name)?;
        validate_qualified("table", &spec.table)?;
        validate_qualified("table", &spec.references_table)?;
        if spec.columns.is_empty() || spec.references_columns.is_empty() {
            return Err(AuthoringError::EmptyColumnList {
                context: format!("foreign key `{}`", spec.name),
            });
        }

        self.push(spec.add_sql());
        Ok(self.push(spec.validate_sql()))
    }

    /// # Errors
    /// Invalid table or constraint names.
    pub fn rename_constraint(&mut self, table: &str, from: &str, to: &str) -> AuthoringResult<'_> {
        validate_qualified("table", table)?;
        validate_identifier("constraint", from)?;
        validate_identifier("constraint", to)?;
        Ok(self.push(format!("ALTER TABLE {table} RENAME CONSTRAINT {from} TO {to}")))
    }

    /// `expression` is emitted verbatim, so literals must carry their quotes.
    ///
    /// # Errors
    /// Invalid table or column name.
    pub fn set_default(&mut self, table: &str, column: &str, expression: &str) -> AuthoringResult<'_> {
        validate_qualified("table", table)?;
        validate_identifier("column", column)?;
        Ok(self.push(format!("ALTER TABLE {table} ALTER COLUMN {column} SET DEFAULT {expression}")))
    }

    /// # Errors
    /// Invalid table or column name.
    pub fn drop_default(&mut self, table: &str, column: &str) -> AuthoringResult<'_> {
        validate_qualified("table", table)?;
        validate_identifier("column", column)?;
        Ok(self.push(format!("ALTER TABLE {table} ALTER COLUMN {column} DROP DEFAULT")))
    }

    /// Enforce NOT NULL through a transient `CHECK` constraint named
    /// `<table>_<column>_not_null`.
    ///
    /// # Errors
    /// Invalid names, including a generated constraint name over 63 bytes; use
    /// [`MigrationScript::set_not_null_with_constraint`] to choose a shorter one.
    pub fn set_not_null(&mut self, table: &str, column: &str) -> AuthoringResult<'_> {
        let constraint = format!("{}_{}_not_null", base_name(table), column);
        self.set_not_null_with_constraint(table, column, &constraint)
    }

    /// Four statements: add `CHECK (column IS NOT NULL) NOT VALID`, validate it
    /// without an exclusive lock, set NOT NULL (the server reuses the validated
    /// check instead of scanning), drop the check.
    ///
    /// # Errors
    /// Invalid table, column or constraint name.
    pub fn set_not_null_with_constraint(
        &mut self,
        table: &str,
        column: &str,
        constraint: &str,
    ) -> AuthoringResult<'_> {
        validate_qualified("table", table)?;
        validate_identifier("column", column)?;
        validate_identifier("constraint", constraint)?;

        self.push(format!(
            "ALTER TABLE {table} ADD CONSTRAINT {constraint} CHECK ({column} IS NOT NULL) NOT VALID"
        ));
        self.push(format!("ALTER TABLE {table} VALIDATE CONSTRAINT {constraint}"));
        self.push(format!("ALTER TABLE {table} ALTER COLUMN {column} SET NOT NULL"));
        Ok(self.push(format!("ALTER TABLE {table} DROP CONSTRAINT IF EXISTS {constraint}")))
    }

    /// # Errors
    /// Invalid table or column name.
    pub fn drop_not_null(&mut self, table: &str, column: &str) -> AuthoringResult<'_> {
        validate_qualified("table", table)?;
        validate_identifier("column", column)?;
        Ok(self.push(format!("ALTER TABLE {table} ALTER COLUMN {column} DROP NOT NULL")))
    }

    /// `None` removes the comment.
    ///
    /// # Errors
    /// Invalid table or column name.
    pub fn comment_on_column(
        &mut self,
        table: &str,
        column: &str,
        comment: Option<&str>,
    ) -> AuthoringResult<'_> {
        validate_qualified("table", table)?;
        validate_identifier("column", column)?;

        let literal = comment.map_or_else(|| "NULL".to_owned(), quote_literal);
        Ok(self.push(format!("COMMENT ON COLUMN {table}.{column} IS {literal}")))
    }

    fn push(&mut self, sql: String) -> &mut Self {
        self.statements.push(Statement::new(sql));
        self
    }
}

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
