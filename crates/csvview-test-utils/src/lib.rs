//! Testing utilities for CsvView workspace
//!
//! Shared record fixtures and tracing setup.

#![allow(missing_docs)]

use chrono::{NaiveDate, NaiveDateTime};
use csvview_record::Value;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test subscriber once per process
///
/// Honours `RUST_LOG`; defaults to `csvview=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("csvview=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub fn timestamp(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap()
}

/// Array-like records from string grids
pub fn grid(rows: &[&[&str]]) -> Vec<Value> {
    rows.iter().map(|row| Value::list(row.iter().copied())).collect()
}

/// Two users nested under `User` plus an `Item`, the second with a null
/// `created` timestamp
pub fn users_with_items() -> Vec<Value> {
    vec![
        Value::map([
            (
                "User",
                Value::map([
                    ("username", Value::from("jose")),
                    ("created", Value::from(timestamp(2010, 1, 5))),
                ]),
            ),
            ("Item", Value::map([("name", "beach")])),
        ]),
        Value::map([
            (
                "User",
                Value::map([("username", Value::from("drew")), ("created", Value::Null)]),
            ),
            ("Item", Value::map([("name", "ball")])),
        ]),
    ]
}

/// Users where `Item.name` is present in only one record
pub fn users_with_optional_fields() -> Vec<Value> {
    vec![
        Value::map([
            ("User", Value::map([("id", Value::from(1)), ("username", Value::from("jose"))])),
            ("Item", Value::map([("type", "beach")])),
        ]),
        Value::map([
            ("User", Value::map([("id", Value::from(2)), ("username", Value::from("drew"))])),
            ("Item", Value::map([("name", "ball"), ("type", "fun")])),
        ]),
    ]
}

/// Records whose text needs quoting
pub fn users_with_special_characters() -> Vec<Value> {
    let record = |username: &str, item: Vec<(&str, &str)>| {
        Value::map([
            ("User", Value::map([("username", username)])),
            ("Item", Value::map(item)),
        ])
    };
    vec![
        record("José", vec![("type", "ñáé")]),
        record(
            "Including,Comma",
            vec![("name", "Containing\"char"), ("type", "Containing'char")],
        ),
        record("Some Space", vec![("name", "A\nNewline"), ("type", "A\tTab")]),
    ]
}

/// Article rows as a query with an `author` association would return them
pub fn articles_with_authors() -> Vec<Value> {
    [
        ("First Article", "First Article Body", "mariano"),
        ("Second Article", "Second Article Body", "larry"),
        ("Third Article", "Third Article Body", "mariano"),
    ]
    .into_iter()
    .map(|(title, body, author)| {
        Value::map([
            ("title", Value::from(title)),
            ("body", Value::from(body)),
            ("author", Value::map([("name", author)])),
        ])
    })
    .collect()
}
