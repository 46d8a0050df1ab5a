//! Round trips against a real PostgreSQL.
//!
//! Skipped unless `DATABASE_URL` is set (a `.env` file is honored).

use pgstmt::prelude::*;
use pgstmt::{RetryPolicy, retry_on_serialization_failure};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_postgres::{Client, IsolationLevel, NoTls, Row};

async fn connect() -> StmtResult<Option<Client>> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => return Ok(None),
    };
    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(Some(client))
}

fn unique_table(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    format!("{prefix}_{}_{nanos}", std::process::id())
}

#[derive(Debug, PartialEq)]
struct Reminder {
    reminder_id: i64,
    content: String,
}

impl FromRow for Reminder {
    fn from_row(row: &Row) -> StmtResult<Self> {
        Ok(Self {
            reminder_id: row.try_get_column("reminder_id")?,
            content: row.try_get_column("content")?,
        })
    }
}

#[tokio::test]
async fn pagination_returns_page_and_total() -> StmtResult<()> {
    let Some(client) = connect().await? else {
        eprintln!("DATABASE_URL is not set; skipping pagination_returns_page_and_total");
        return Ok(());
    };

    client
        .batch_execute(
            "CREATE TEMP TABLE reminders (
                reminder_id BIGINT PRIMARY KEY,
                user_id TEXT NOT NULL,
                content TEXT NOT NULL
            )",
        )
        .await?;

    for id in 1..=12i64 {
        let owner = if id <= 11 { "42" } else { "7" };
        insert("reminders")
            .set("reminder_id", id)
            .set("user_id", owner)
            .set("content", format!("reminder {id}"))
            .compile()?
            .execute(&client)
            .await?;
    }

    let by_owner = |page_index: i64| {
        select("reminders")
            .columns(["reminder_id", "content"])
            .filter()
            .field("user_id", Comparison::EQUAL, "42")
            .paginate(page_index, 5, ["reminder_id"])
            .compile()
    };

    let page = by_owner(2)?.fetch_as::<Reminder>(&client).await?;
    assert_eq!(page.total_count, 11);
    assert_eq!(page.page_count(), 3);
    assert_eq!(
        page.items,
        vec![Reminder {
            reminder_id: 11,
            content: "reminder 11".into()
        }]
    );

    let past_end = by_owner(4)?.fetch(&client).await?;
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.total_count, 11);
    assert!(past_end.is_past_end());

    let fallback = by_owner(3)?.fetch_or_first_page(&client).await?;
    assert_eq!(fallback.page_index, 0);
    assert_eq!(fallback.items.len(), 5);
    assert_eq!(fallback.total_count, 11);

    let first = by_owner(0)?.fetch(&client).await?;
    assert_eq!(first.items.len(), 5);
    assert_eq!(first.total_count, 11);

    let count: Option<i64> = select_count("reminders").compile()?.fetchval(&client).await?;
    assert_eq!(count, Some(12));

    let exists: Option<bool> = select("reminders")
        .column("1")
        .filter()
        .field("user_id", Comparison::EQUAL, "7")
        .exists()
        .compile()?
        .fetchval(&client)
        .await?;
    assert_eq!(exists, Some(true));

    Ok(())
}

#[tokio::test]
async fn write_skew_surfaces_as_serialization_failure() -> StmtResult<()> {
    let (Some(mut first), Some(mut second)) = (connect().await?, connect().await?) else {
        eprintln!("DATABASE_URL is not set; skipping write_skew_surfaces_as_serialization_failure");
        return Ok(());
    };

    let table = unique_table("pgstmt_oncall");
    first
        .batch_execute(&format!(
            "CREATE TABLE {table} (doctor TEXT PRIMARY KEY, on_call BOOLEAN NOT NULL);
             INSERT INTO {table} VALUES ('alice', true), ('bob', true);"
        ))
        .await?;

    let on_call = select_count(&table)
        .filter()
        .field("on_call", Comparison::EQUAL, true)
        .compile()?;
    let leave = |doctor: &str| {
        update(&table)
            .set("on_call", false)
            .filter()
            .field("doctor", Comparison::EQUAL, doctor)
            .compile()
    };

    let tx1 = first
        .build_transaction()
        .isolation_level(IsolationLevel::Serializable)
        .start()
        .await?;
    let tx2 = second
        .build_transaction()
        .isolation_level(IsolationLevel::Serializable)
        .start()
        .await?;

    assert_eq!(on_call.fetchval::<i64>(&tx1).await?, Some(2));
    assert_eq!(on_call.fetchval::<i64>(&tx2).await?, Some(2));
    leave("alice")?.execute(&tx1).await?;

    let second_result = async {
        leave("bob")?.execute(&tx2).await?;
        tx1.commit().await?;
        tx2.commit().await?;
        Ok::<(), StmtError>(())
    }
    .await;

    let err = second_result.expect_err("one of the two transactions must fail");
    assert!(err.is_serialization_failure(), "unexpected error: {err}");

    // the losing transaction rolled back, so somebody is still on call
    let attempts = std::sync::atomic::AtomicU32::new(0);
    retry_on_serialization_failure(&RetryPolicy::new().max_attempts(3), || async {
        attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let still_on_call = on_call.fetchval::<i64>(&second).await?;
        assert!(matches!(still_on_call, Some(n) if n >= 1));
        Ok::<(), StmtError>(())
    })
    .await?;
    assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 1);

    second
        .batch_execute(&format!("DROP TABLE {table}"))
        .await?;
    Ok(())
}
