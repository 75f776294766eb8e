//! Integration tests for environment validation through the public API.
//!
//! Covers the documented startup scenarios, JSON-loaded rule specs, and
//! validation against the real process environment.

use assert_matches::assert_matches;
use serde_json::json;

use envrules_core::{
    validate, validate_env, EnvValue, EnvironmentStore, ErrorKind, MemoryStore, ProcessEnv,
    RuleSpec, ValidationError, Validator,
};

fn store_from(value: serde_json::Value) -> MemoryStore {
    serde_json::from_value(value).expect("store fixture should deserialize")
}

// ---------------------------------------------------------------------------
// Test: startup scenarios
// ---------------------------------------------------------------------------

/// A port string passes its full rule list and is left in the store as an
/// integer.
#[test]
fn port_is_validated_and_coerced() {
    let mut store = store_from(json!({"PORT": "8080"}));
    let rules = RuleSpec::new().rule("PORT", "required|int|min:1|max:65535");

    validate(&mut store, &rules).expect("8080 is a valid port");

    assert_eq!(store.get("PORT"), EnvValue::Int(8080));
}

/// An empty host fails `required` before `string` is considered.
#[test]
fn empty_host_is_missing() {
    let mut store = store_from(json!({"HOST": ""}));
    let rules = RuleSpec::new().rule("HOST", "required|string");

    let err = validate(&mut store, &rules).expect_err("empty host must fail");

    assert_matches!(err, ValidationError::MissingRequired { ref key } if key == "HOST");
    assert_eq!(
        err.to_string(),
        "Environment variable 'HOST' is required but missing or empty"
    );
}

/// `yes` is not one of the accepted boolean tokens.
#[test]
fn debug_yes_is_not_a_boolean() {
    let mut store = store_from(json!({"DEBUG": "yes"}));
    let rules = RuleSpec::new().rule("DEBUG", "bool");

    let err = validate(&mut store, &rules).expect_err("yes must fail");

    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.key(), "DEBUG");
    assert_eq!(
        err.to_string(),
        "Environment variable 'DEBUG' must be a boolean, got 'yes'"
    );
}

/// Optional variables skip type and format checks when unset.
#[test]
fn optional_variables_pass_when_unset() {
    let mut store = MemoryStore::new();
    let rules = RuleSpec::new()
        .rule("TIMEOUT", "int|min:1")
        .rule("VERBOSE", "bool")
        .rule("CALLBACK_URL", "url")
        .rule("ADMIN_EMAIL", "email")
        .rule("BIND_IP", "ip");

    validate(&mut store, &rules).expect("unset optional variables pass");

    assert!(store.is_empty(), "validation must not create variables");
}

// ---------------------------------------------------------------------------
// Test: multi-variable runs
// ---------------------------------------------------------------------------

/// Every variable is coerced when every rule passes.
#[test]
fn full_config_passes() {
    let mut store = store_from(json!({
        "APP_URL": "https://app.example.com",
        "DB_HOST": "10.0.0.5",
        "DB_PORT": "5432",
        "MAIL_FROM": "noreply@example.com",
        "APP_DEBUG": "false",
        "APP_ENV": "production",
    }));
    let rules = RuleSpec::from_json(
        r#"{
            "APP_URL": "required|url",
            "DB_HOST": "required|ip",
            "DB_PORT": ["required", "int", "min:1", "max:65535"],
            "MAIL_FROM": "email",
            "APP_DEBUG": "bool|equal:false",
            "APP_ENV": ["required", "string", "equal:production"]
        }"#,
    )
    .expect("rule spec should parse");

    validate(&mut store, &rules).expect("config is valid");

    assert_eq!(store.get("DB_PORT"), EnvValue::Int(5432));
    assert_eq!(store.get("APP_DEBUG"), EnvValue::Bool(false));
    assert_eq!(store.get("APP_ENV"), EnvValue::from("production"));
}

/// The first failure aborts the run; variables after it are not coerced.
#[test]
fn first_failure_aborts_run() {
    let mut store = store_from(json!({"A_PORT": "abc", "B_FLAG": "1"}));
    let rules = RuleSpec::new().rule("A_PORT", "int").rule("B_FLAG", "bool");

    let err = validate(&mut store, &rules).expect_err("A_PORT is not an integer");

    assert_eq!(err.key(), "A_PORT");
    assert_eq!(store.get("B_FLAG"), EnvValue::from("1"));
}

/// A validator can be reused across specs; later specs see earlier coercions.
#[test]
fn validator_reuse_sees_previous_coercions() {
    let mut store = store_from(json!({"WORKERS": "4"}));
    let mut validator = Validator::new(&mut store);

    validator
        .validate(&RuleSpec::new().rule("WORKERS", "int"))
        .expect("4 is an integer");
    let err = validator
        .validate(&RuleSpec::new().rule("WORKERS", "string"))
        .expect_err("WORKERS is now an integer");

    assert_matches!(
        err,
        ValidationError::TypeMismatch { value: EnvValue::Int(4), .. }
    );
}

// ---------------------------------------------------------------------------
// Test: process environment
// ---------------------------------------------------------------------------

/// `validate_env` coerces through the shared process store; the typed value
/// is cached and the textual value is mirrored to the process environment.
#[test]
fn validate_env_coerces_process_variables() {
    let port_key = "ENVRULES_IT_PROCESS_PORT";
    let flag_key = "ENVRULES_IT_PROCESS_FLAG";
    std::env::set_var(port_key, "9000");
    std::env::set_var(flag_key, "TRUE");

    let rules = RuleSpec::new()
        .rule(port_key, "required|int|max:65535")
        .rule(flag_key, ["bool", "equal:1"]);
    validate_env(&rules).expect("process variables are valid");

    {
        let env = ProcessEnv::shared();
        assert_eq!(env.get(port_key), EnvValue::Int(9000));
        assert_eq!(env.get(flag_key), EnvValue::Bool(true));
    }
    assert_eq!(std::env::var(flag_key).as_deref(), Ok("true"));

    let mut env = ProcessEnv::shared();
    env.forget(port_key);
    env.forget(flag_key);
    std::env::remove_var(port_key);
    std::env::remove_var(flag_key);
}

/// Unset process variables fail `required` with the variable named.
#[test]
fn validate_env_reports_missing_variable() {
    let key = "ENVRULES_IT_PROCESS_UNSET";
    let err = validate_env(&RuleSpec::new().rule(key, "required"))
        .expect_err("unset variable must fail");

    assert_eq!(err.kind(), ErrorKind::MissingRequired);
    assert_eq!(err.key(), key);
}
