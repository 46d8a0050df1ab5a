use super::*;
use crate::constraint::{Comparison, Connector, Constraint, and_expression, or_expression};
use crate::value::Value;

/// Placeholder numbers in order of first appearance.
fn placeholders(sql: &str) -> Vec<usize> {
    let mut seen = Vec::new();
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                let n: usize = sql[start..end].parse().unwrap();
                if !seen.contains(&n) {
                    seen.push(n);
                }
            }
            i = end;
        } else {
            i += 1;
        }
    }
    seen
}

fn assert_contiguous(sql: &str, args: &[Value]) {
    let expected: Vec<usize> = (1..=args.len()).collect();
    assert_eq!(placeholders(sql), expected, "{sql}");
}

// ==================== SELECT ====================

#[test]
fn test_select_columns() {
    let (sql, args) = select("users").columns(["id", "name"]).build().unwrap();
    assert_eq!(sql, "SELECT id, name FROM users");
    assert!(args.is_empty());
}

#[test]
fn test_select_distinct_and_count() {
    let (sql, _) = select("pairings").column("user_id").distinct().build().unwrap();
    assert_eq!(sql, "SELECT DISTINCT user_id FROM pairings");

    let (sql, _) = select_count("pairings").build().unwrap();
    assert_eq!(sql, "SELECT COUNT(*) FROM pairings");
}

#[test]
fn test_select_requires_columns() {
    let err = select("users").build().unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_select_where_order_limit() {
    let (sql, args) = select("users")
        .column("*")
        .filter()
        .field("status", Comparison::EQUAL, "active")
        .and_field("age", Comparison::GREATER_OR_EQUAL, 18)
        .order_by_desc("created_at")
        .then_by("id")
        .limit(10)
        .offset(20)
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM users WHERE status = $1 AND age >= $2 \
         ORDER BY created_at DESC, id LIMIT $3 OFFSET $4"
    );
    assert_eq!(
        args,
        vec![
            Value::from("active"),
            Value::Int(18),
            Value::Int(10),
            Value::Int(20)
        ]
    );
}

#[test]
fn test_limit_only_offset_only_and_neither() {
    let (sql, args) = select("t").column("a").offset(5).build().unwrap();
    assert_eq!(sql, "SELECT a FROM t OFFSET $1");
    assert_eq!(args, vec![Value::Int(5)]);

    let (sql, _) = select("t").column("a").window(Some(3), None).build().unwrap();
    assert_eq!(sql, "SELECT a FROM t LIMIT $1");

    let err = select("t").column("a").window(None, None).build().unwrap_err();
    assert!(err.is_validation());

    let err = select("t").column("a").limit(-1).build().unwrap_err();
    assert!(err.is_validation());
}

// ==================== JOIN ====================

#[test]
fn test_join_kinds_and_alias() {
    let (sql, args) = select("messages m")
        .columns(["m.id", "a.name"])
        .join(JoinKind::Left, "authors", "a.id", "m.author_id")
        .alias("a")
        .join(JoinKind::FullOuter, "threads t", "t.id", "m.thread_id")
        .filter()
        .field("m.channel_id", Comparison::EQUAL, "55")
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT m.id, a.name FROM messages m \
         LEFT JOIN authors AS a ON a.id = m.author_id \
         FULL OUTER JOIN threads t ON t.id = m.thread_id \
         WHERE m.channel_id = $1"
    );
    assert_eq!(args.len(), 1);

    for (kind, token) in [
        (JoinKind::Inner, "INNER JOIN"),
        (JoinKind::Right, "RIGHT JOIN"),
        (JoinKind::Outer, "OUTER JOIN"),
    ] {
        let (sql, _) = select("a").column("*").join(kind, "b", "b.id", "a.b_id").build().unwrap();
        assert_eq!(sql, format!("SELECT * FROM a {token} b ON b.id = a.b_id"));
    }
}

// ==================== WHERE ====================

#[test]
fn test_where_requires_predicate() {
    let err = select("users").column("*").filter().build().unwrap_err();
    assert!(err.is_validation());
    let err = delete("users").filter().build().unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_fields_matches_chained_fields() {
    let grouped = select("users")
        .column("*")
        .filter()
        .fields(
            Connector::And,
            [
                ("a", Comparison::EQUAL, Value::Int(1)),
                ("b", Comparison::EQUAL, Value::Int(2)),
            ],
        )
        .build()
        .unwrap();
    let chained = select("users")
        .column("*")
        .filter()
        .field("a", Comparison::EQUAL, 1)
        .and_field("b", Comparison::EQUAL, 2)
        .build()
        .unwrap();
    assert_eq!(grouped, chained);
    assert_eq!(grouped.0, "SELECT * FROM users WHERE a = $1 AND b = $2");
}

#[test]
fn test_fields_with_single_comparison_is_rejected() {
    let err = select("users")
        .column("*")
        .filter()
        .fields(Connector::Or, [("a", Comparison::EQUAL, 1)])
        .build()
        .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_mixed_connectors_group_left_to_right() {
    let (sql, args) = select("t")
        .column("*")
        .filter()
        .field("a", Comparison::EQUAL, 1)
        .and_field("b", Comparison::EQUAL, 2)
        .or_field("c", Comparison::EQUAL, 3)
        .build()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM t WHERE (a = $1 AND b = $2) OR c = $3");
    assert_contiguous(&sql, &args);
}

#[test]
fn test_raw_fields_in_where() {
    let (sql, args) = select("reminders")
        .column("*")
        .filter()
        .field("sent", Comparison::EQUAL, false)
        .and_raw_field("remind_at", Comparison::LESS, "NOW() AT TIME ZONE 'utc'")
        .or_raw_field("force", Comparison::EQUAL, "TRUE")
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM reminders WHERE (sent = $1 AND remind_at < NOW() AT TIME ZONE 'utc') \
         OR force = TRUE"
    );
    assert_eq!(args, vec![Value::Bool(false)]);
}

#[test]
fn test_filter_with_strategy() {
    fn owned_by(user_id: &'static str) -> impl FnOnce(Where<Select>) -> Where<Select> {
        move |w| {
            w.field("user_id", Comparison::EQUAL, user_id)
                .and_field("archived", Comparison::EQUAL, false)
        }
    }

    let (sql, args) = select("notes")
        .column("note_id")
        .filter_with(owned_by("42"))
        .build()
        .unwrap();
    assert_eq!(sql, "SELECT note_id FROM notes WHERE user_id = $1 AND archived = $2");
    assert_eq!(args, vec![Value::from("42"), Value::Bool(false)]);
}

#[test]
fn test_in_list_inside_chain() {
    let (sql, args) = select("users")
        .column("*")
        .filter()
        .field("status", Comparison::EQUAL, "active")
        .and_expression(Constraint::is_in("role", ["admin", "mod"]))
        .limit(5)
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM users WHERE status = $1 AND role IN ($2, $3) LIMIT $4"
    );
    assert_eq!(args.len(), 4);
}

/// Command rules lookup: server-wide or channel-specific rules that apply to
/// a whole command group, a single command, or everything.
#[test]
fn test_command_rules_scenario() {
    let server_id = "1234567890123";
    let channel_id = "999909123183";
    let group = "reminder";
    let command = "view";

    let (sql, args) = select("command_rules")
        .columns(["rule_id", "group_id", "command_id"])
        .filter()
        .expression(and_expression([
            Constraint::field("server_id", Comparison::EQUAL, server_id),
            or_expression([
                Constraint::field("channel_id", Comparison::EQUAL, None::<&str>),
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
        .build()
        .unwrap();

    assert_eq!(
        sql,
        "SELECT rule_id, group_id, command_id FROM command_rules WHERE \
         (server_id = $1 AND (channel_id IS NULL OR channel_id = $2)) AND \
         ((command_group IS NULL AND command IS NULL) OR \
         (command_group = $3 AND (command IS NULL OR command = $4)))"
    );
    assert_eq!(
        args,
        vec![
            Value::from(server_id),
            Value::from(channel_id),
            Value::from(group),
            Value::from(command),
        ]
    );
}

#[test]
fn test_or_expression_nests_previous_root() {
    let (sql, _) = select("t")
        .column("*")
        .filter()
        .field("a", Comparison::EQUAL, 1)
        .and_field("b", Comparison::EQUAL, 2)
        .or_expression(and_expression([
            Constraint::field("c", Comparison::EQUAL, 3),
            Constraint::field("d", Comparison::EQUAL, 4),
        ]))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM t WHERE (a = $1 AND b = $2) OR (c = $3 AND d = $4)"
    );
}

// ==================== INSERT ====================

#[test]
fn test_insert_with_raw_and_returning() {
    let (sql, args) = insert("reminders")
        .set("user_id", "42")
        .set_raw("created_at", "NOW() AT TIME ZONE 'utc'")
        .set("content", "water plants")
        .set_opt("channel_id", None::<&str>)
        .returning(["reminder_id"])
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO reminders (user_id, created_at, content) \
         VALUES ($1, NOW() AT TIME ZONE 'utc', $2) RETURNING reminder_id"
    );
    assert_eq!(args, vec![Value::from("42"), Value::from("water plants")]);
}

#[test]
fn test_insert_requires_fields() {
    assert!(insert("users").build().unwrap_err().is_validation());
}

#[test]
fn test_on_conflict_do_nothing() {
    let (sql, args) = insert("pairings")
        .set("user_id", "1")
        .set("partner_id", "2")
        .on_conflict(["user_id", "partner_id"])
        .do_nothing()
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO pairings (user_id, partner_id) VALUES ($1, $2) \
         ON CONFLICT (user_id, partner_id) DO NOTHING"
    );
    assert_eq!(args.len(), 2);

    let (sql, _) = insert("pairings")
        .set("user_id", "1")
        .on_conflict(Vec::<String>::new())
        .do_nothing()
        .build()
        .unwrap();
    assert!(sql.ends_with("ON CONFLICT DO NOTHING"));
}

#[test]
fn test_on_conflict_do_update_continues_numbering() {
    let (sql, args) = insert("wallets")
        .set("user_id", "7")
        .set("balance", 100)
        .on_conflict(["user_id"])
        .do_update()
        .set_raw("balance", "wallets.balance + EXCLUDED.balance")
        .set("updated_by", "bot")
        .set_excluded("user_id")
        .returning(["balance"])
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO wallets (user_id, balance) VALUES ($1, $2) \
         ON CONFLICT (user_id) DO UPDATE SET balance = wallets.balance + EXCLUDED.balance, \
         updated_by = $3, user_id = EXCLUDED.user_id RETURNING balance"
    );
    assert_eq!(args.len(), 3);
    assert_contiguous(&sql, &args);
}

#[test]
fn test_on_conflict_do_update_validation() {
    let no_fields = insert("t")
        .set("a", 1)
        .on_conflict(["a"])
        .do_update()
        .build();
    assert!(no_fields.unwrap_err().is_validation());

    let no_target = insert("t")
        .set("a", 1)
        .on_conflict(Vec::<String>::new())
        .do_update()
        .set("b", 2)
        .build();
    assert!(no_target.unwrap_err().is_validation());
}

// ==================== UPDATE / DELETE ====================

#[test]
fn test_update_where_returning() {
    let (sql, args) = update("wallets")
        .set_raw("balance", "balance - 5")
        .set("updated_at", Value::Null)
        .filter()
        .field("user_id", Comparison::EQUAL, "7")
        .returning(["balance"])
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE wallets SET balance = balance - 5, updated_at = $1 \
         WHERE user_id = $2 RETURNING balance"
    );
    assert_eq!(args, vec![Value::Null, Value::from("7")]);
}

#[test]
fn test_update_requires_fields() {
    assert!(update("users").build().unwrap_err().is_validation());
}

#[test]
fn test_delete_with_and_without_where() {
    let (sql, args) = delete("sessions").build().unwrap();
    assert_eq!(sql, "DELETE FROM sessions");
    assert!(args.is_empty());

    let (sql, args) = delete("sessions")
        .filter()
        .field("expires_at", Comparison::LESS, 1_700_000_000i64)
        .returning(["session_id", "user_id"])
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "DELETE FROM sessions WHERE expires_at < $1 RETURNING session_id, user_id"
    );
    assert_eq!(args.len(), 1);

    assert!(delete("").build().unwrap_err().is_validation());
}

#[test]
fn test_returning_requires_columns() {
    let err = delete("t").returning(Vec::<String>::new()).build().unwrap_err();
    assert!(err.is_validation());
}

// ==================== wrappers ====================

#[test]
fn test_exists_wraps_whole_statement() {
    let (sql, args) = select("pairings")
        .column("1")
        .filter()
        .field("user_id", Comparison::EQUAL, "1")
        .limit(1)
        .exists()
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT EXISTS (SELECT 1 FROM pairings WHERE user_id = $1 LIMIT $2)"
    );
    assert_eq!(args, vec![Value::from("1"), Value::Int(1)]);
}

#[test]
fn test_function_call_with_extra_args() {
    let (sql, args) = select("wallets")
        .column("balance")
        .filter()
        .field("user_id", Comparison::EQUAL, "1")
        .call("COALESCE")
        .arg("0")
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT COALESCE((SELECT balance FROM wallets WHERE user_id = $1), 0)"
    );
    assert_eq!(args.len(), 1);

    let (sql, _) = select_count("users").call("to_jsonb").build().unwrap();
    assert_eq!(sql, "SELECT to_jsonb((SELECT COUNT(*) FROM users))");
}

// ==================== properties ====================

#[test]
fn test_build_is_repeatable() {
    let chain = select("users")
        .column("*")
        .filter()
        .field("a", Comparison::EQUAL, 1)
        .or_field("b", Comparison::LIKE, "x%")
        .order_by("id")
        .limit(3);
    let first = chain.build().unwrap();
    let second = chain.build().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_raw_setters_never_add_arguments() {
    let base = update("t").set("a", 1);
    let (_, before) = base.clone().build().unwrap();
    let (sql, after) = base.set_raw("b", "a * 2").build().unwrap();
    assert_eq!(before.len(), after.len());
    assert!(sql.contains("b = a * 2"));
}

#[test]
fn test_deep_tree_numbering_is_contiguous() {
    let mut tree = Constraint::field("c0", Comparison::EQUAL, 0);
    for depth in 1..12 {
        let leaf = Constraint::field(format!("c{depth}"), Comparison::NOT_EQUAL, depth);
        tree = if depth % 2 == 0 {
            and_expression([leaf, tree, Constraint::raw("r", Comparison::LESS, "1")])
        } else {
            or_expression([tree, leaf])
        };
    }
    let (sql, args) = update("t")
        .set("x", "y")
        .filter()
        .expression(tree)
        .returning(["x"])
        .build()
        .unwrap();
    assert_eq!(args.len(), 13);
    assert_contiguous(&sql, &args);
}
