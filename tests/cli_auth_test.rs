//! Integration tests for sign-in, sign-out and session persistence.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_login_lands_on_dashboard() {
    let env = TestEnv::new();
    let json = env.json(&[
        "login",
        "--email",
        "jane@farm.com",
        "--password",
        "123456",
        "--name",
        "Jane",
    ]);
    assert_eq!(json["user_name"], "Jane");
    assert_eq!(json["landing"], "dashboard");
}

#[test]
fn test_login_blank_name_defaults() {
    let env = TestEnv::new();
    let json = env.json(&["login", "--email", "jane@farm.com", "--password", "123456"]);
    assert_eq!(json["user_name"], "New User");
}

#[test]
fn test_short_password_rejected() {
    let env = TestEnv::new();
    env.ap()
        .args(["login", "--email", "jane@farm.com", "--password", "12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 6 characters"));

    let whoami = env.json(&["whoami"]);
    assert_eq!(whoami["logged_in"], false);
}

#[test]
fn test_session_persists_across_invocations() {
    let env = TestEnv::logged_in();
    let json = env.json(&["whoami"]);
    assert_eq!(json["logged_in"], true);
    assert_eq!(json["user_email"], "john@agrifarm.com");

    let screen = env.json(&[]);
    assert_eq!(screen["active"], "dashboard");
    assert_eq!(screen["user"]["name"], "John Farmer");
}

#[test]
fn test_logout_keeps_email_for_next_sign_in() {
    let env = TestEnv::logged_in();
    let json = env.json(&["logout"]);
    assert_eq!(json["logged_out"], true);

    let screen = env.json(&[]);
    assert_eq!(screen["page"], "auth");
    assert_eq!(screen["view"]["remembered_email"], "john@agrifarm.com");
}

#[test]
fn test_pages_require_session() {
    let env = TestEnv::new();
    env.ap()
        .args(["open", "tasks"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error\""))
        .stderr(predicate::str::contains("sign in"));
}

#[test]
fn test_error_human_readable() {
    let env = TestEnv::new();
    env.ap()
        .args(["-H", "open", "financials"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: "));
}
