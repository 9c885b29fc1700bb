//! Runs against a real MySQL server when `SQLADAPTER_MYSQL_HOST` is set.
//! Optional: `SQLADAPTER_MYSQL_PORT`, `SQLADAPTER_MYSQL_USER`,
//! `SQLADAPTER_MYSQL_PASSWORD`, `SQLADAPTER_MYSQL_DATABASE` (default `test`).

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use sqladapter::drivers::MySqlDriver;
use sqladapter::{Adapter, ConnectionConfig, Database, DbError, SqlValue};

static COUNTER: AtomicU32 = AtomicU32::new(0);

fn live_config() -> Option<ConnectionConfig> {
    let host = std::env::var("SQLADAPTER_MYSQL_HOST").ok()?;
    let env = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());
    let mut config = ConnectionConfig::new(env("SQLADAPTER_MYSQL_DATABASE", "test"))
        .host(host)
        .user(env("SQLADAPTER_MYSQL_USER", "root"))
        .password(env("SQLADAPTER_MYSQL_PASSWORD", ""))
        .table_prefix("wk_");
    if let Ok(port) = std::env::var("SQLADAPTER_MYSQL_PORT") {
        config = config.port(port.parse().expect("SQLADAPTER_MYSQL_PORT must be a port number"));
    }
    Some(config)
}

fn unique(tag: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{tag}_{nanos}_{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Connects and creates a private table; `None` when no server is configured.
async fn setup() -> Option<(Adapter<MySqlDriver>, String)> {
    let Some(config) = live_config() else {
        eprintln!("SQLADAPTER_MYSQL_HOST not set; skipping live MySQL test");
        return None;
    };
    let mut db = Adapter::<MySqlDriver>::connect(config).await.unwrap();
    let table = unique("test_table");
    db.exec(
        &format!(
            "CREATE TABLE IF NOT EXISTS {{{{{table}}}}} (
                `id` int(10) UNSIGNED NOT NULL AUTO_INCREMENT,
                `str` varchar(255) NOT NULL DEFAULT '',
                PRIMARY KEY (`id`)
            ) ENGINE=InnoDB DEFAULT CHARACTER SET=utf8mb4"
        ),
        (),
    )
    .await
    .unwrap();
    Some((db, table))
}

async fn teardown(mut db: Adapter<MySqlDriver>, table: &str) {
    db.exec(&format!("DROP TABLE IF EXISTS {{{{{table}}}}}"), ())
        .await
        .unwrap();
}

async fn insert_row(db: &mut Adapter<MySqlDriver>, table: &str, value: &str) -> u64 {
    db.exec(
        &format!("INSERT INTO {{{{{table}}}}} (str) VALUES (?)"),
        [SqlValue::from(value)],
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_live_insert_and_last_insert_id() {
    let Some((mut db, table)) = setup().await else {
        return;
    };

    assert_eq!(insert_row(&mut db, &table, "row").await, 1);
    let id = db.last_insert_id().await.unwrap();
    assert!(!id.is_empty() && id != "0", "unexpected id {id}");

    teardown(db, &table).await;
}

#[tokio::test]
async fn test_live_fetch_helpers() {
    let Some((mut db, table)) = setup().await else {
        return;
    };

    insert_row(&mut db, &table, "a").await;
    insert_row(&mut db, &table, "b").await;
    let rows = db
        .get_all(&format!("SELECT * FROM {{{{{table}}}}} LIMIT 2"), ())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    let marker = unique("row");
    insert_row(&mut db, &table, &marker).await;
    let row = db
        .get_row(
            &format!("SELECT * FROM {{{{{table}}}}} WHERE str = ?"),
            [SqlValue::from(marker.as_str())],
        )
        .await
        .unwrap()
        .expect("inserted row");
    assert_eq!(row.get("str").unwrap(), Some(marker.as_str()));

    let value = db
        .get_column(
            &format!("SELECT str FROM {{{{{table}}}}} WHERE str = ?"),
            [SqlValue::from(marker.as_str())],
        )
        .await
        .unwrap();
    assert_eq!(value.as_deref(), Some(marker.as_str()));

    teardown(db, &table).await;
}

#[tokio::test]
async fn test_live_query_error_matches_last_error() {
    let Some((mut db, table)) = setup().await else {
        return;
    };

    let err = db
        .query(&format!("SELECT x FROM tb_{}", unique("missing")), ())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Query(_)));
    assert!(!db.get_last_err().is_empty());
    assert_eq!(db.get_last_err(), err.message());

    teardown(db, &table).await;
}

#[tokio::test]
async fn test_live_rollback_discards_nested_work() {
    let Some((mut db, table)) = setup().await else {
        return;
    };

    let kept = unique("kept");
    insert_row(&mut db, &table, &kept).await;

    db.begin_transaction().await.unwrap();
    db.begin_transaction().await.unwrap();
    insert_row(&mut db, &table, "discarded").await;
    db.roll_back().await.unwrap();
    insert_row(&mut db, &table, "discarded").await;
    db.roll_back().await.unwrap();

    let last = db
        .get_column(
            &format!("SELECT str FROM {{{{{table}}}}} ORDER BY id DESC"),
            (),
        )
        .await
        .unwrap();
    assert_eq!(last.as_deref(), Some(kept.as_str()));

    teardown(db, &table).await;
}

#[tokio::test]
async fn test_live_table_info() {
    let Some((mut db, table)) = setup().await else {
        return;
    };

    let columns = db
        .get_table_info(&format!("{{{{{table}}}}}"))
        .await
        .unwrap();
    let names: Vec<_> = columns
        .iter()
        .map(|c| c.get("Field").unwrap().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["id", "str"]);
    assert_eq!(columns[0].get("Key").unwrap(), Some("PRI"));

    assert!(db.get_table_info("no_such_table").await.unwrap().is_empty());

    teardown(db, &table).await;
}
