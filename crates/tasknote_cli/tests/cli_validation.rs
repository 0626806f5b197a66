mod support;

use support::{run, stderr};

#[test]
fn add_blank_title_fails_before_any_request() {
    let output = run(&["add", "   "]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ERROR: invalid_input - Title cannot be empty"));
}

#[test]
fn add_rejects_malformed_due_date() {
    let output = run(&["add", "Buy milk", "--due", "tomorrow"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ERROR: invalid_input"));
}

#[test]
fn register_short_password_fails_locally() {
    let output = run(&["register", "e2euser_1", "e2e_1@test.com", "short"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Password must be at least 8 characters long"));
}

#[test]
fn register_rejects_malformed_email() {
    let output = run(&["register", "e2euser_1", "not-an-email", "password123"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Please enter a valid email address"));
}

#[test]
fn unknown_filter_is_invalid_input() {
    let output = run(&["list", "someday"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ERROR: invalid_input"));
}

#[test]
fn unknown_config_override_is_rejected() {
    let output = run(&["status", "--config-override", "colour=red"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unknown config field"));
}

#[test]
fn non_numeric_id_is_a_parse_error() {
    let output = run(&["done", "abc"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ERROR: invalid_input"));
}
