//! Integration tests for page navigation, the field context and the
//! scenario planner.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_open_each_page() {
    let env = TestEnv::logged_in();
    for page in ["dashboard", "financials", "marketplace", "tasks", "planning", "diagnosis"] {
        let json = env.json(&["open", page]);
        assert_eq!(json["active"], page);
        assert_eq!(json["page"], page);
    }
}

#[test]
fn test_open_rejects_unknown_page() {
    let env = TestEnv::logged_in();
    env.ap().args(["open", "settings"]).assert().failure();
}

#[test]
fn test_moisture_layer_shows_notice() {
    let env = TestEnv::logged_in();
    let json = env.json(&["open", "dashboard", "--layer", "moisture"]);
    assert!(json["notice"].as_str().unwrap().contains("Soil Moisture"));

    let plain = env.json(&["open", "dashboard"]);
    assert!(plain.get("notice").is_none());
}

#[test]
fn test_field_list_marks_current() {
    let env = TestEnv::logged_in();
    let json = env.json(&["field", "list"]);
    assert_eq!(json["current_field_id"], "maize-field-1");
    let options = json["options"].as_array().unwrap();
    assert_eq!(options[0]["value"], "maize-field-1");
    assert_eq!(options[0]["selected"], true);
}

#[test]
fn test_field_switch_persists() {
    let env = TestEnv::logged_in();
    let json = env.json(&["field", "switch", "poultry-coop-1"]);
    assert_eq!(json["current_field_id"], "poultry-coop-1");
    assert_eq!(json["fell_back"], false);

    let whoami = env.json(&["whoami"]);
    assert_eq!(whoami["current_field_id"], "poultry-coop-1");
}

#[test]
fn test_field_switch_unknown_falls_back_to_first() {
    let env = TestEnv::logged_in();
    env.json(&["field", "switch", "poultry-coop-1"]);
    let json = env.json(&["field", "switch", "north-paddock"]);
    assert_eq!(json["requested"], "north-paddock");
    assert_eq!(json["current_field_id"], "maize-field-1");
    assert_eq!(json["fell_back"], true);
}

#[test]
fn test_plan_defaults() {
    let env = TestEnv::logged_in();
    let json = env.json(&["plan"]);
    assert_eq!(json["report"]["baseline"], 7.8);
    assert_eq!(json["report"]["inputs"]["fertilizer"], "medium");
}

#[test]
fn test_plan_clamps_inputs() {
    let env = TestEnv::logged_in();
    let json = env.json(&["plan", "--rainfall", "250", "--pest", "40"]);
    assert_eq!(json["report"]["inputs"]["rainfall"], 100.0);
    assert_eq!(json["report"]["inputs"]["pest_pressure"], 10.0);
}

#[test]
fn test_plan_more_fertilizer_never_hurts() {
    let env = TestEnv::logged_in();
    let none = env.json(&["plan", "--fertilizer", "none"]);
    let high = env.json(&["plan", "--fertilizer", "high"]);
    assert!(
        high["report"]["projected"].as_f64().unwrap()
            >= none["report"]["projected"].as_f64().unwrap()
    );
}

#[test]
fn test_theme_switch_persists() {
    let env = TestEnv::logged_in();
    let json = env.json(&["theme", "blue"]);
    assert_eq!(json["theme"], "theme-blue");
    assert_eq!(json["changed"], true);

    assert_eq!(env.json(&["theme"])["theme"], "theme-blue");
    assert_eq!(env.json(&[])["theme"], "theme-blue");
}

#[test]
fn test_theme_rejects_unknown() {
    let env = TestEnv::logged_in();
    env.ap()
        .args(["theme", "purple"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("theme"));
}

#[test]
fn test_reset_requires_force() {
    let env = TestEnv::logged_in();
    env.json(&["task", "delete", "1"]);

    env.ap().arg("reset").assert().failure();

    let json = env.json(&["reset", "--force"]);
    assert_eq!(json["reset"], true);

    env.json(&["login", "-e", "john@agrifarm.com", "-p", "secret-pass"]);
    let view = env.json(&["task", "list"]);
    assert!(view["tasks"].as_array().unwrap().iter().any(|t| t["id"] == 1));
}
