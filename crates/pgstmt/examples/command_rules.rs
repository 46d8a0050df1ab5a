//! Print the statements a chat-bot repository compiles, without a database.
//!
//! Run with: cargo run --example command_rules -p pgstmt

use pgstmt::prelude::*;

/// Rules for a server, optionally narrowed to a channel, that cover either
/// everything, a whole command group, or one command of that group.
fn command_rules(
    server_id: &str,
    channel_id: &str,
    group: &str,
    command: &str,
) -> StmtResult<CompiledQuery> {
    select("command_rules")
        .columns(["rule_id", "group_id", "command_id"])
        .filter()
        .expression(and_expression([
            Constraint::field("server_id", Comparison::EQUAL, server_id),
            or_expression([
                Constraint::field("channel_id", Comparison::EQUAL, Value::Null),
                Constraint::field("channel_id", Comparison::EQUAL, channel_id),
            ]),
        ]))
        .and_expression(or_expression([
            and_expression([
                Constraint::field("command_group", Comparison::EQUAL, Value::Null),
                Constraint::field("command", Comparison::EQUAL, Value::Null),
            ]),
            and_expression([
                Constraint::field("command_group", Comparison::EQUAL, group),
                or_expression([
                    Constraint::field("command", Comparison::EQUAL, Value::Null),
                    Constraint::field("command", Comparison::EQUAL, command),
                ]),
            ]),
        ]))
        .compile()
}

fn print(label: &str, sql: &str, args: &[Value]) {
    println!("-- {label}");
    println!("{sql}");
    let rendered: Vec<String> = args.iter().map(Value::to_string).collect();
    println!("   args: [{}]\n", rendered.join(", "));
}

fn main() -> StmtResult<()> {
    let rules = command_rules("1234567890123", "999909123183", "reminder", "view")?;
    print("command rules", rules.sql(), rules.args());

    let upsert = insert("pairings")
        .set("user_id", "1234")
        .set("partner_id", "5678")
        .set_raw("paired_at", "NOW() AT TIME ZONE 'utc'")
        .on_conflict(["user_id"])
        .do_update()
        .set_excluded("partner_id")
        .set_excluded("paired_at")
        .returning(["user_id", "partner_id"])
        .compile()?;
    print("pairing upsert", upsert.sql(), upsert.args());

    let page = select("reminders")
        .columns(["reminder_id", "content", "remind_at"])
        .filter()
        .field("user_id", Comparison::EQUAL, "1234")
        .and_raw_field("remind_at", Comparison::GREATER, "NOW() AT TIME ZONE 'utc'")
        .paginate(2, 5, ["remind_at"])
        .compile()?;
    print(
        "reminders, page 3",
        page.query().sql(),
        page.query().args(),
    );

    let has_wallet = select("wallets")
        .column("1")
        .filter()
        .field("user_id", Comparison::EQUAL, "1234")
        .exists()
        .compile()?;
    print("wallet exists", has_wallet.sql(), has_wallet.args());

    Ok(())
}
