//! Declarative migration plans
//!
//! A plan is the file form of a [`MigrationScript`]: a name, an optional lock
//! timeout and a list of operations tagged by `op`. Parsing the file is left
//! to the caller (`pgsafe-infra` reads TOML and JSON).
//!
//! ```toml
//! name = "orders_user_fk"
//! lock_timeout_secs = 5
//!
//! [[operations]]
//! op = "add_column"
//! table = "orders"
//! column = "user_id"
//! type = "bigint"
//!
//! [[operations]]
//! op = "add_foreign_key"
//! name = "orders_user_fk"
//! table = "orders"
//! columns = ["user_id"]
//! references_table = "users"
//! references_columns = ["id"]
//! timeout_secs = 600
//! ```

use pgsafe_domain::{AuthoringError, ParamType, SqlValue, Statement};
use serde::{Deserialize, Serialize};

use super::script::MigrationScript;
use super::specs::{ForeignKeySpec, IndexSpec};

/// A migration described as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub name: String,
    #[serde(default)]
    pub lock_timeout_secs: Option<u64>,
    #[serde(default)]
    pub operations: Vec<PlannedOperation>,
}

/// One operation plus its optional statement timeout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedOperation {
    #[serde(flatten)]
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Every schema helper, plus `execute` for parameterised statements.
///
/// `add_sql` exists so that plans carrying raw SQL fail loudly at authoring
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    CreateTable {
        table: String,
        columns: Vec<String>,
    },
    DropTable {
        table: String,
    },
    AddColumn {
        table: String,
        column: String,
        #[serde(rename = "type")]
        data_type: String,
    },
    DropColumn {
        table: String,
        column: String,
    },
    AddIndex(IndexSpec),
    DropIndex {
        name: String,
    },
    RenameIndex {
        from: String,
        to: String,
    },
    AddForeignKey(ForeignKeySpec),
    RenameConstraint {
        table: String,
        from: String,
        to: String,
    },
    SetDefault {
        table: String,
        column: String,
        expression: String,
    },
    DropDefault {
        table: String,
        column: String,
    },
    SetNotNull {
        table: String,
        column: String,
        #[serde(default)]
        constraint: Option<String>,
    },
    DropNotNull {
        table: String,
        column: String,
    },
    CommentOnColumn {
        table: String,
        column: String,
        #[serde(default)]
        comment: Option<String>,
    },
    Execute {
        sql: String,
        #[serde(default)]
        params: Vec<SqlValue>,
        /// One per parameter; inferred from the values when omitted.
        #[serde(default)]
        types: Option<Vec<ParamType>>,
    },
    AddSql {
        sql: String,
    },
}

impl Operation {
    /// Append this operation's statements to `script`.
    ///
    /// # Errors
    /// Any validation error raised by the matching helper.
    pub fn apply<'a>(
        &self,
        script: &'a mut MigrationScript,
    ) -> Result<&'a mut MigrationScript, AuthoringError> {
        match self {
            Self::CreateTable { table, columns } => script.create_table(table, columns.as_slice()),
            Self::DropTable { table } => script.drop_table(table),
            Self::AddColumn { table, column, data_type } => {
                script.add_column(table, column, data_type)
            }
            Self::DropColumn { table, column } => script.drop_column(table, column),
            Self::AddIndex(spec) => script.add_index(spec.clone()),
            Self::DropIndex { name } => script.drop_index(name),
            Self::RenameIndex { from, to } => script.rename_index(from, to),
            Self::AddForeignKey(spec) => script.add_foreign_key(spec.clone()),
            Self::RenameConstraint { table, from, to } => script.rename_constraint(table, from, to),
            Self::SetDefault { table, column, expression } => {
                script.set_default(table, column, expression)
            }
            Self::DropDefault { table, column } => script.drop_default(table, column),
            Self::SetNotNull { table, column, constraint: Some(constraint) } => {
                script.set_not_null_with_constraint(table, column, constraint)
            }
            Self::SetNotNull { table, column, constraint: None } => {
                script.set_not_null(table, column)
            }
            Self::DropNotNull { table, column } => script.drop_not_null(table, column),
            Self::CommentOnColumn { table, column, comment } => {
                script.comment_on_column(table, column, comment.as_deref())
            }
            Self::Execute { sql, params, types } => {
                let types = types
                    .clone()
                    .unwrap_or_else(|| params.iter().map(ParamType::infer).collect());
                let statement = Statement::with_params(sql.as_str(), params.clone(), types)?;
                Ok(script.execute(statement))
            }
            Self::AddSql { sql } => script.add_sql(sql.as_str()),
        }
    }
}

impl MigrationPlan {
    /// Build the script, stopping at the first invalid operation.
    ///
    /// # Errors
    /// The first [`AuthoringError`] raised by an operation.
    pub fn into_script(self) -> Result<MigrationScript, AuthoringError> {
        let mut script = MigrationScript::new(self.name);
        if let Some(secs) = self.lock_timeout_secs {
            script = script.with_lock_timeout(secs);
        }

        for planned in &self.operations {
            match planned.timeout_secs {
                Some(secs) => {
                    script.with_statement_timeout(secs, |s| planned.operation.apply(s))?;
                }
                None => {
                    planned.operation.apply(&mut script)?;
                }
            }
        }

        Ok(script)
    }
}
