//! Integration tests for the marketplace commands.

mod common;

use common::TestEnv;
use predicates::prelude::*;

fn listing_ids(view: &serde_json::Value) -> Vec<String> {
    view["listings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_market_list_all() {
    let env = TestEnv::logged_in();
    let view = env.json(&["market", "list"]);
    assert_eq!(view["query"]["category"], "all");
    assert_eq!(listing_ids(&view), vec!["list-1", "list-2"]);
    assert!(view["price_chart"].is_object());
}

#[test]
fn test_market_list_category_is_case_insensitive() {
    let env = TestEnv::logged_in();
    let view = env.json(&["market", "list", "--category", "Fertilizer"]);
    assert_eq!(listing_ids(&view), vec!["list-2"]);
}

#[test]
fn test_market_search_matches_seller() {
    let env = TestEnv::logged_in();
    let view = env.json(&["market", "list", "--search", "agrochem"]);
    assert_eq!(listing_ids(&view), vec!["list-1"]);
}

#[test]
fn test_market_search_without_match_has_empty_message() {
    let env = TestEnv::logged_in();
    let view = env.json(&["market", "list", "--search", "tractor"]);
    assert!(listing_ids(&view).is_empty());
    assert!(view["empty_message"].is_string());
}

#[test]
fn test_market_post_puts_listing_first() {
    let env = TestEnv::logged_in();
    let posted = env.json(&[
        "market",
        "post",
        "Hybrid Maize Seed",
        "--price",
        "2500",
        "--category",
        "Seeds",
    ]);
    assert_eq!(posted["category"], "seeds");
    assert_eq!(posted["seller"], "John Farmer");
    let id = posted["id"].as_str().unwrap().to_string();

    let view = env.json(&["market", "list"]);
    assert_eq!(listing_ids(&view)[0], id);
}

#[test]
fn test_market_post_rejects_all_category() {
    let env = TestEnv::logged_in();
    env.ap()
        .args(["market", "post", "Thing", "--price", "10", "--category", "all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("category"));
}

#[test]
fn test_market_contact_card() {
    let env = TestEnv::logged_in();
    let card = env.json(&["market", "contact", "list-1"]);
    assert_eq!(card["seller"], "AgroChemicals Ltd.");
    assert_eq!(card["mailto"], "mailto:sales@agrochemicals.com");
    assert_eq!(card["whatsapp_link"], "https://wa.me/254700100200");
    assert_eq!(card["phone_link"], "tel:020222333");
}

#[test]
fn test_market_contact_unknown_listing() {
    let env = TestEnv::logged_in();
    env.ap()
        .args(["market", "contact", "list-99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Listing not found"));
}
