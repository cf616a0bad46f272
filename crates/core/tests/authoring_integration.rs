//! Authoring surface and plan-to-run integration tests.

mod support;

use std::sync::Arc;

use pgsafe_core::{
    ForeignKeySpec, IndexSpec, MigrationPlan, MigrationRunner, MigrationScript, WrapperGate,
};
use pgsafe_domain::{AuthoringError, Statement};

use support::{lock_timeout, RecordingObserver, ScriptedDispatcher};

fn sql(script: &MigrationScript) -> Vec<String> {
    MigrationRunner::render(script)
}

#[test]
fn index_names_are_capped_at_63_bytes() {
    let mut script = MigrationScript::new("indexes");

    let accepted = "i".repeat(63);
    script.add_index(IndexSpec::new(accepted.as_str(), "orders", ["user_id"])).unwrap();

    let rejected = "i".repeat(64);
    let err = script.add_index(IndexSpec::new(rejected.as_str(), "orders", ["user_id"])).unwrap_err();

    assert!(matches!(
        err,
        AuthoringError::IdentifierTooLong { length: 64, max: 63, ref name, .. } if *name == rejected
    ));
    assert_eq!(script.len(), 1);
}

#[test]
fn create_table_rejects_foreign_keys_in_any_spelling() {
    let spellings = [
        "user_id bigint REFERENCES users (id)",
        "user_id bigint references users(id)",
        "FOREIGN KEY (user_id) REFERENCES users (id)",
        "foreign   key (user_id) references users (id)",
        "Foreign\tKey (user_id) References users (id)",
        "CONSTRAINT fk FOREIGN\nKEY (user_id) REFERENCES users (id)",
    ];

    for definition in spellings {
        let mut script = MigrationScript::new("tables");
        let err = script.create_table("orders", &["id bigserial PRIMARY KEY", definition]).unwrap_err();

        assert_eq!(err, AuthoringError::InlineForeignKey { table: "orders".into() }, "{definition}");
        assert!(script.is_empty());
    }
}

#[test]
fn create_table_accepts_lookalike_column_names() {
    let mut script = MigrationScript::new("tables");

    script
        .create_table("audit", &["id bigserial PRIMARY KEY", "referenced_at timestamptz", "foreign_keyword text"])
        .unwrap();

    assert_eq!(script.len(), 1);
}

#[test]
fn timeout_brackets_only_its_own_statement() {
    let mut script = MigrationScript::new("backfill");
    script.add_column("users", "email", "text").unwrap();
    script.execute(Statement::new("UPDATE users SET email = lower(email)").with_timeout(900));
    script.drop_column("users", "legacy").unwrap();

    assert_eq!(
        sql(&script),
        vec![
            "ALTER TABLE users ADD COLUMN IF NOT EXISTS email text",
            "SET statement_timeout TO '900s'",
            "UPDATE users SET email = lower(email)",
            "RESET statement_timeout",
            "ALTER TABLE users DROP COLUMN IF EXISTS legacy",
        ]
    );
}

#[test]
fn foreign_keys_are_added_not_valid_then_validated() {
    let mut script = MigrationScript::new("fk");
    script
        .add_foreign_key(
            ForeignKeySpec::new("orders_user_fk", "orders", ["user_id"], "users", ["id"])
                .on_delete("CASCADE"),
        )
        .unwrap();

    assert_eq!(
        sql(&script),
        vec![
            "ALTER TABLE orders ADD CONSTRAINT orders_user_fk FOREIGN KEY (user_id) \
             REFERENCES users (id) ON DELETE CASCADE NOT VALID",
            "ALTER TABLE orders VALIDATE CONSTRAINT orders_user_fk",
        ]
    );
}

#[test]
fn raw_sql_is_refused() {
    let mut script = MigrationScript::new("raw");

    let err = script.add_sql("ALTER TABLE users ADD COLUMN x int").unwrap_err();

    assert!(matches!(err, AuthoringError::ForbiddenRawStatementUsage { .. }));
    assert!(script.is_empty());
}

#[tokio::test(start_paused = true)]
async fn plan_runs_through_a_wrapped_connection() {
    let plan: MigrationPlan = serde_json::from_str(
        r#"{
            "name": "orders_user",
            "lock_timeout_secs": 5,
            "operations": [
                { "op": "add_column", "table": "orders", "column": "user_id", "type": "bigint" },
                { "op": "add_index", "name": "orders_user_idx", "table": "orders",
                  "columns": ["user_id"] }
            ]
        }"#,
    )
    .unwrap();
    let script = plan.into_script().unwrap();

    let dispatcher = Arc::new(ScriptedDispatcher::new(vec![Ok(0), lock_timeout(), Ok(0), Ok(0)]));
    let observer = Arc::new(RecordingObserver::default());
    let runner = MigrationRunner::new(
        WrapperGate::default().with_observer(observer.clone()).wrap(dispatcher.clone()),
    );

    let report = runner.run(&script).await.unwrap();

    assert_eq!(report.statements, 3);
    assert_eq!(observer.count(), 1);
    assert_eq!(
        dispatcher.dispatched_sql(),
        vec![
            "SET lock_timeout TO '5s'",
            "ALTER TABLE orders ADD COLUMN IF NOT EXISTS user_id bigint",
            "ALTER TABLE orders ADD COLUMN IF NOT EXISTS user_id bigint",
            "CREATE INDEX CONCURRENTLY IF NOT EXISTS orders_user_idx ON orders (user_id)",
        ]
    );
}

#[tokio::test]
async fn authoring_errors_stop_before_any_dispatch() {
    let plan: MigrationPlan = serde_json::from_str(
        r#"{
            "name": "broken",
            "operations": [
                { "op": "drop_column", "table": "orders", "column": "legacy" },
                { "op": "add_sql", "sql": "DROP TABLE orders" }
            ]
        }"#,
    )
    .unwrap();

    let err = plan.into_script().unwrap_err();

    assert!(matches!(err, AuthoringError::ForbiddenRawStatementUsage { ref sql } if sql == "DROP TABLE orders"));
}
