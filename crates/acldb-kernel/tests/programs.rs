use acldb_kernel::{Kernel, KernelConfig, ProgramOutcome, Right, Status, StatusCode, Value, Verdict};

fn program(principal: &str, password: &str, lines: &[&str]) -> String {
    let mut text = format!("as principal {principal} password \"{password}\" do\n");
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str("***\n");
    text
}

fn admin(kernel: &mut Kernel, lines: &[&str]) -> ProgramOutcome {
    kernel.run_program(&program("admin", "admin", lines))
}

fn codes(outcome: &ProgramOutcome) -> Vec<StatusCode> {
    outcome.statuses.iter().map(|status| status.status).collect()
}

fn with_alice_and_bob() -> Kernel {
    let mut kernel = Kernel::new(KernelConfig::default());
    let outcome = admin(
        &mut kernel,
        &[
            r#"create principal alice "a""#,
            r#"create principal bob "b""#,
        ],
    );
    assert_eq!(outcome.verdict, Verdict::Committed);
    kernel
}

#[test]
fn assignment_copies_values() {
    let mut kernel = Kernel::default();
    let outcome = admin(
        &mut kernel,
        &[
            "set x = []",
            r#"append to x with {v = "1"}"#,
            "set y = x",
            r#"append to y with "extra""#,
            "foreach e in y replacewith \"z\"",
            "return x",
        ],
    );
    assert_eq!(
        outcome.statuses.last(),
        Some(&Status::returning(Value::List(vec![Value::record([("v", "1")])])))
    );
    assert_eq!(
        kernel.variable("y").unwrap().value,
        Value::List(vec![Value::from("z"), Value::from("z")])
    );
}

#[test]
fn admin_needs_no_edges() {
    let mut kernel = with_alice_and_bob();
    kernel.run_program(&program("alice", "a", &[r#"set secret = "s""#]));
    for right in Right::ALL {
        assert!(kernel.can_exercise("secret", "admin", right));
    }
    let outcome = admin(&mut kernel, &["return secret"]);
    assert_eq!(outcome.statuses, vec![Status::returning(Value::from("s"))]);
}

#[test]
fn principal_can_always_revoke_itself() {
    let mut kernel = with_alice_and_bob();
    admin(
        &mut kernel,
        &[r#"set x = "v""#, "set delegation x admin read -> alice"],
    );
    assert!(kernel.can_exercise("x", "alice", Right::Read));
    let outcome = kernel.run_program(&program(
        "alice",
        "a",
        &["delete delegation x alice read -> alice"],
    ));
    assert_eq!(codes(&outcome), vec![StatusCode::DeleteDelegation]);
    assert!(!kernel.can_exercise("x", "alice", Right::Read));
}

#[test]
fn revocation_does_not_cascade() {
    let mut kernel = with_alice_and_bob();
    admin(
        &mut kernel,
        &[
            r#"set x = "v""#,
            "set delegation x admin write -> alice",
            "set delegation x admin delegate -> alice",
        ],
    );
    let outcome = kernel.run_program(&program(
        "alice",
        "a",
        &["set delegation x alice write -> bob"],
    ));
    assert_eq!(outcome.verdict, Verdict::Committed);
    admin(&mut kernel, &["delete delegation x admin write -> alice"]);

    assert!(!kernel.can_exercise("x", "alice", Right::Write));
    assert!(kernel.can_exercise("x", "bob", Right::Write));
    let outcome = kernel.run_program(&program("bob", "b", &[r#"set x = "bob was here""#]));
    assert_eq!(codes(&outcome), vec![StatusCode::Set]);
}

#[test]
fn failing_command_discards_the_whole_program() {
    let mut kernel = Kernel::default();
    admin(&mut kernel, &[r#"set keep = "old""#]);
    let outcome = admin(
        &mut kernel,
        &[
            r#"set keep = "new""#,
            r#"set fresh = "x""#,
            r#"create principal carol "c""#,
            r#"append to missing with "s""#,
        ],
    );
    assert_eq!(outcome.statuses, vec![Status::new(StatusCode::Failed)]);
    assert_eq!(kernel.variable("keep").unwrap().value, Value::from("old"));
    assert!(kernel.variable("fresh").is_none());
    assert!(!kernel.principal_exists("carol"));
}

#[test]
fn foreach_visits_elements_in_order() {
    let mut kernel = Kernel::default();
    let outcome = admin(
        &mut kernel,
        &[
            "set l = []",
            r#"append to l with {n = "3", tag = "c"}"#,
            r#"append to l with {n = "1", tag = "a"}"#,
            r#"append to l with {n = "2", tag = "b"}"#,
            "foreach e in l replacewith {first = e.tag, second = e.n}",
            "return l",
        ],
    );
    let expected = Value::List(vec![
        Value::record([("first", "c"), ("second", "3")]),
        Value::record([("first", "a"), ("second", "1")]),
        Value::record([("first", "b"), ("second", "2")]),
    ]);
    assert_eq!(outcome.statuses.last(), Some(&Status::returning(expected)));
}

#[test]
fn projecting_names_from_a_local_copy() {
    let mut kernel = Kernel::default();
    let outcome = admin(
        &mut kernel,
        &[
            "set records = []",
            r#"append to records with {name = "mike", date = "1-1-90"}"#,
            r#"append to records with {name = "dave", date = "1-1-85"}"#,
            "local names = records",
            "foreach rec in names replacewith rec.name",
            "return names",
        ],
    );
    assert_eq!(
        codes(&outcome),
        vec![
            StatusCode::Set,
            StatusCode::Append,
            StatusCode::Append,
            StatusCode::Local,
            StatusCode::Foreach,
            StatusCode::Returning,
        ]
    );
    assert_eq!(
        outcome.to_ndjson().lines().last(),
        Some(r#"{"status":"RETURNING","output":["mike","dave"]}"#)
    );
    assert_eq!(
        kernel.variable("records").unwrap().value,
        Value::List(vec![
            Value::record([("name", "mike"), ("date", "1-1-90")]),
            Value::record([("name", "dave"), ("date", "1-1-85")]),
        ])
    );
    assert!(kernel.variable("names").is_none());
}

#[test]
fn non_admin_cannot_create_principals() {
    let mut kernel = with_alice_and_bob();
    let outcome = kernel.run_program(&program("alice", "a", &[r#"create principal eve "e""#]));
    assert_eq!(outcome.statuses, vec![Status::new(StatusCode::Denied)]);
    assert!(!kernel.principal_exists("eve"));
}

#[test]
fn appending_to_undefined_variable_fails() {
    let mut kernel = Kernel::default();
    let outcome = admin(&mut kernel, &[r#"append to x with "s""#]);
    assert_eq!(outcome.to_ndjson(), "{\"status\":\"FAILED\"}\n");
}

#[test]
fn delegating_all_from_admin() {
    let mut kernel = with_alice_and_bob();
    kernel.run_program(&program("bob", "b", &[r#"set bobs = "b1""#]));
    admin(
        &mut kernel,
        &[r#"set one = "1""#, "set delegation all admin read -> alice"],
    );
    let outcome = kernel.run_program(&program(
        "alice",
        "a",
        &["return {a = one, b = bobs}"],
    ));
    assert_eq!(
        outcome.statuses,
        vec![Status::returning(Value::record([("a", "1"), ("b", "b1")]))]
    );
}

#[test]
fn rights_granted_to_anyone_reach_everyone() {
    let mut kernel = with_alice_and_bob();
    admin(
        &mut kernel,
        &[r#"set notice = "hi""#, "set delegation notice admin read -> anyone"],
    );
    let outcome = kernel.run_program(&program("bob", "b", &["return notice"]));
    assert_eq!(outcome.statuses, vec![Status::returning(Value::from("hi"))]);
}

#[test]
fn rolled_back_default_delegator_is_restored() {
    let mut kernel = with_alice_and_bob();
    let outcome = admin(&mut kernel, &["default delegator = alice", "return nope"]);
    assert_eq!(outcome.verdict, Verdict::Failed);
    assert_eq!(kernel.default_delegator(), "anyone");
}

#[test]
fn default_delegator_only_affects_later_principals() {
    let mut kernel = with_alice_and_bob();
    kernel.run_program(&program("alice", "a", &[r#"set mine = "m""#]));
    admin(
        &mut kernel,
        &["default delegator = alice", r#"create principal carol "c""#],
    );
    assert!(kernel.can_exercise("mine", "carol", Right::Read));
    assert!(!kernel.can_exercise("mine", "bob", Right::Read));
}

#[test]
fn violation_after_successes_reports_denied() {
    let mut kernel = with_alice_and_bob();
    admin(&mut kernel, &[r#"set x = "v""#]);
    let outcome = kernel.run_program(&program(
        "bob",
        "b",
        &[r#"set own = "o""#, "return x"],
    ));
    assert_eq!(outcome.statuses, vec![Status::new(StatusCode::Denied)]);
    assert!(kernel.variable("own").is_none());
}

#[test]
fn non_admin_exit_is_denied() {
    let mut kernel = with_alice_and_bob();
    let outcome = kernel.run_program(&program("bob", "b", &["exit"]));
    assert_eq!(outcome.verdict, Verdict::Denied);
    assert!(!outcome.shutdown);
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let mut kernel = Kernel::default();
    let outcome = admin(
        &mut kernel,
        &["// setup", "", r#"set x = "a" // trailing"#, "return x"],
    );
    assert_eq!(codes(&outcome), vec![StatusCode::Set, StatusCode::Returning]);
}

#[test]
fn changed_password_is_committed() {
    let mut kernel = with_alice_and_bob();
    kernel.run_program(&program("alice", "a", &[r#"change password alice "new""#]));
    let stale = kernel.run_program(&program("alice", "a", &["return \"x\""]));
    assert_eq!(stale.verdict, Verdict::Denied);
    let fresh = kernel.run_program(&program("alice", "new", &["return \"x\""]));
    assert_eq!(fresh.verdict, Verdict::Committed);
}
