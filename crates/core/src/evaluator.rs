//! Rule evaluator.
//!
//! Each variable's current value is read once into a cursor, then every
//! directive in its rule list runs left to right against that cursor. The
//! `int` and `bool` directives coerce: the new value goes back to the store
//! and replaces the cursor, so later directives see it. The first failing
//! directive aborts the whole run.

use url::Url;
use validator::{ValidateEmail, ValidateIp};

use crate::error::ValidationError;
use crate::rules::{RuleList, RuleSpec};
use crate::store::{EnvironmentStore, ProcessEnv};
use crate::value::{integer_cast, parse_number, EnvValue};

/// What a passing directive asks the evaluator to do with the value.
#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Pass,
    Coerce(EnvValue),
}

/// Variable and parameter a directive runs with.
struct Check<'a> {
    key: &'a str,
    param: Option<&'a str>,
}

impl<'a> Check<'a> {
    fn require_param(&self, rule: &'static str) -> Result<&'a str, ValidationError> {
        self.param.ok_or_else(|| ValidationError::MissingParam {
            key: self.key.to_string(),
            rule,
        })
    }
}

type Handler = fn(&Check<'_>, &EnvValue) -> Result<Outcome, ValidationError>;

const HANDLERS: &[(&str, Handler)] = &[
    ("required", check_required),
    ("int", check_int),
    ("integer", check_int),
    ("bool", check_bool),
    ("boolean", check_bool),
    ("string", check_string),
    ("url", check_url),
    ("email", check_email),
    ("ip", check_ip),
    ("min", check_min),
    ("max", check_max),
    ("equal", check_equal),
];

fn handler_for(name: &str) -> Option<Handler> {
    HANDLERS
        .iter()
        .find(|(rule, _)| *rule == name)
        .map(|(_, handler)| *handler)
}

/// Directive names the evaluator understands, aliases included.
pub fn known_rules() -> impl Iterator<Item = &'static str> {
    HANDLERS.iter().map(|(rule, _)| *rule)
}

/// Validates rule specs against an injected [`EnvironmentStore`].
pub struct Validator<'s, S: EnvironmentStore + ?Sized> {
    store: &'s mut S,
}

impl<'s, S: EnvironmentStore + ?Sized> Validator<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// Run every directive for every variable, stopping at the first failure.
    pub fn validate(&mut self, rules: &RuleSpec) -> Result<(), ValidationError> {
        for (key, list) in rules.iter() {
            if let Err(err) = self.validate_variable(key, list) {
                tracing::warn!(key, error = %err, "Environment validation failed");
                return Err(err);
            }
        }
        Ok(())
    }

    fn validate_variable(&mut self, key: &str, list: &RuleList) -> Result<(), ValidationError> {
        let mut value = self.store.get(key);
        tracing::debug!(key, rules = %list, value = %value, "Validating environment variable");

        for directive in list.directives() {
            let handler =
                handler_for(&directive.name).ok_or_else(|| ValidationError::UnknownRule {
                    key: key.to_string(),
                    rule: directive.name.clone(),
                })?;

            let check = Check {
                key,
                param: directive.param.as_deref(),
            };

            if let Outcome::Coerce(coerced) = handler(&check, &value)? {
                tracing::debug!(key, from = %value, to = %coerced, "Coerced environment variable");
                self.store.set(key, coerced.clone());
                value = coerced;
            }
        }
        Ok(())
    }
}

/// Validate `rules` against `store`.
pub fn validate<S: EnvironmentStore + ?Sized>(
    store: &mut S,
    rules: &RuleSpec,
) -> Result<(), ValidationError> {
    Validator::new(store).validate(rules)
}

/// Validate `rules` against the process environment.
///
/// Coercions are visible to later [`ProcessEnv::shared`] readers as typed
/// values and to `std::env::var` readers in textual form.
pub fn validate_env(rules: &RuleSpec) -> Result<(), ValidationError> {
    let mut env = ProcessEnv::shared();
    validate(&mut *env, rules)
}

// ---------------------------------------------------------------------------
// Directive handlers
// ---------------------------------------------------------------------------

fn check_required(check: &Check<'_>, value: &EnvValue) -> Result<Outcome, ValidationError> {
    match value {
        EnvValue::Absent => Err(missing(check)),
        EnvValue::Str(s) if s.is_empty() => Err(missing(check)),
        _ => Ok(Outcome::Pass),
    }
}

fn missing(check: &Check<'_>) -> ValidationError {
    ValidationError::MissingRequired {
        key: check.key.to_string(),
    }
}

fn check_int(check: &Check<'_>, value: &EnvValue) -> Result<Outcome, ValidationError> {
    match value {
        EnvValue::Absent | EnvValue::Int(_) => Ok(Outcome::Pass),
        other => match other.as_number().and_then(|n| n.to_integral()) {
            Some(i) => Ok(Outcome::Coerce(EnvValue::Int(i))),
            None => Err(mismatch(check, "an integer", other)),
        },
    }
}

fn check_bool(check: &Check<'_>, value: &EnvValue) -> Result<Outcome, ValidationError> {
    match value {
        EnvValue::Absent | EnvValue::Bool(_) => Ok(Outcome::Pass),
        other => match other.to_string().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Outcome::Coerce(EnvValue::Bool(true))),
            "false" | "0" => Ok(Outcome::Coerce(EnvValue::Bool(false))),
            _ => Err(mismatch(check, "a boolean", other)),
        },
    }
}

fn check_string(check: &Check<'_>, value: &EnvValue) -> Result<Outcome, ValidationError> {
    match value {
        EnvValue::Absent | EnvValue::Str(_) => Ok(Outcome::Pass),
        other => Err(mismatch(check, "a string", other)),
    }
}

fn mismatch(check: &Check<'_>, expected: &'static str, value: &EnvValue) -> ValidationError {
    ValidationError::TypeMismatch {
        key: check.key.to_string(),
        expected,
        value: value.clone(),
    }
}

fn check_url(check: &Check<'_>, value: &EnvValue) -> Result<Outcome, ValidationError> {
    check_format(check, value, "URL", is_url)
}

/// Only `mailto`, `news` and `file` URLs may omit the host, so
/// `localhost:8080` (scheme `localhost`, no host) is rejected.
fn is_url(text: &String) -> bool {
    match Url::parse(text) {
        Ok(url) => url.host().is_some() || matches!(url.scheme(), "mailto" | "news" | "file"),
        Err(_) => false,
    }
}

fn check_email(check: &Check<'_>, value: &EnvValue) -> Result<Outcome, ValidationError> {
    check_format(check, value, "email address", is_email)
}

/// The domain must be dotted (`ops@example.com`) or an address literal
/// (`ops@[10.0.0.1]`); `ops@localhost` is rejected.
fn is_email(text: &String) -> bool {
    let dotted = text
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.') || domain.starts_with('['));
    dotted && text.validate_email()
}

fn check_ip(check: &Check<'_>, value: &EnvValue) -> Result<Outcome, ValidationError> {
    check_format(check, value, "IP address", |text| text.validate_ip())
}

/// Non-string scalars are checked by their textual form.
fn check_format(
    check: &Check<'_>,
    value: &EnvValue,
    format: &'static str,
    is_valid: fn(&String) -> bool,
) -> Result<Outcome, ValidationError> {
    if value.is_absent() || is_valid(&value.to_string()) {
        return Ok(Outcome::Pass);
    }
    Err(ValidationError::InvalidFormat {
        key: check.key.to_string(),
        format,
    })
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Min,
    Max,
}

impl Bound {
    fn rule(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    fn violated(self, actual: f64, limit: f64) -> bool {
        match self {
            Self::Min => actual < limit,
            Self::Max => actual > limit,
        }
    }

    fn describe(self, param: &str, unit: &str) -> String {
        match self {
            Self::Min => format!("be at least {param}{unit}"),
            Self::Max => format!("not exceed {param}{unit}"),
        }
    }
}

fn check_min(check: &Check<'_>, value: &EnvValue) -> Result<Outcome, ValidationError> {
    check_bound(check, value, Bound::Min)
}

fn check_max(check: &Check<'_>, value: &EnvValue) -> Result<Outcome, ValidationError> {
    check_bound(check, value, Bound::Max)
}

/// Numbers compare by value, strings by byte length.
fn check_bound(
    check: &Check<'_>,
    value: &EnvValue,
    bound: Bound,
) -> Result<Outcome, ValidationError> {
    let rule = bound.rule();
    let param = check.require_param(rule)?;

    let (actual, unit) = match value {
        EnvValue::Absent => return Ok(Outcome::Pass),
        EnvValue::Int(i) => (*i as f64, ""),
        EnvValue::Float(f) => (*f, ""),
        EnvValue::Str(s) => (s.len() as f64, " characters"),
        EnvValue::Bool(_) => {
            return Err(ValidationError::Unvalidatable {
                key: check.key.to_string(),
                rule,
            })
        }
    };

    let limit = parse_number(param).ok_or_else(|| ValidationError::InvalidParam {
        key: check.key.to_string(),
        rule,
        param: param.to_string(),
    })?;

    if bound.violated(actual, limit.as_f64()) {
        return Err(ValidationError::RangeError {
            key: check.key.to_string(),
            rule,
            limit: bound.describe(param.trim(), unit),
        });
    }
    Ok(Outcome::Pass)
}

/// Integers compare to the integer cast of the parameter and booleans to its
/// `true`/`1` reading; anything else compares as text. Absent never matches.
fn check_equal(check: &Check<'_>, value: &EnvValue) -> Result<Outcome, ValidationError> {
    let param = check.require_param("equal")?;

    let matches = match value {
        EnvValue::Int(i) => *i == integer_cast(param),
        EnvValue::Bool(b) => *b == matches!(param.to_ascii_lowercase().as_str(), "true" | "1"),
        EnvValue::Str(s) => s == param,
        EnvValue::Float(_) => value.to_string() == param,
        EnvValue::Absent => false,
    };

    if matches {
        Ok(Outcome::Pass)
    } else {
        Err(ValidationError::NotEqual {
            key: check.key.to_string(),
            expected: param.to_string(),
        })
    }
}
