//! Rule list types.
//!
//! A [`RuleSpec`] maps variable names to [`RuleList`]s; each list expands to
//! an ordered sequence of [`Directive`]s such as `required` or `min:5`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One validation instruction, split on the first `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub param: Option<String>,
}

impl Directive {
    /// `"min:5"` parses to `("min", Some("5"))`, `"min:"` to
    /// `("min", Some(""))` and `"required"` to `("required", None)`.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((name, param)) => Self {
                name: name.to_string(),
                param: Some(param.to_string()),
            },
            None => Self {
                name: raw.to_string(),
                param: None,
            },
        }
    }
}

/// Ordered directives for one variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleList {
    /// `"required|int|min:1"`, split on `|`.
    Piped(String),
    /// Explicit directives, used without re-splitting.
    Sequence(Vec<String>),
}

impl RuleList {
    /// Raw directive strings in evaluation order.
    pub fn parts(&self) -> Vec<&str> {
        match self {
            Self::Piped(source) => source.split('|').collect(),
            Self::Sequence(parts) => parts.iter().map(String::as_str).collect(),
        }
    }

    pub fn directives(&self) -> Vec<Directive> {
        self.parts().into_iter().map(Directive::parse).collect()
    }
}

impl fmt::Display for RuleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Piped(source) => f.write_str(source),
            Self::Sequence(parts) => write!(f, "[{}]", parts.join(", ")),
        }
    }
}

impl From<&str> for RuleList {
    fn from(source: &str) -> Self {
        Self::Piped(source.to_string())
    }
}

impl From<String> for RuleList {
    fn from(source: String) -> Self {
        Self::Piped(source)
    }
}

impl From<Vec<String>> for RuleList {
    fn from(parts: Vec<String>) -> Self {
        Self::Sequence(parts)
    }
}

impl From<Vec<&str>> for RuleList {
    fn from(parts: Vec<&str>) -> Self {
        Self::Sequence(parts.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RuleList {
    fn from(parts: [&str; N]) -> Self {
        Self::Sequence(parts.into_iter().map(str::to_string).collect())
    }
}

/// Variable name to rule list.
///
/// Variables are evaluated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSpec {
    rules: BTreeMap<String, RuleList>,
}

impl RuleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; a later rule for the same key replaces the earlier one.
    pub fn rule(mut self, key: impl Into<String>, list: impl Into<RuleList>) -> Self {
        self.insert(key, list);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, list: impl Into<RuleList>) {
        self.rules.insert(key.into(), list.into());
    }

    pub fn get(&self, key: &str) -> Option<&RuleList> {
        self.rules.get(key)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleList)> {
        self.rules.iter().map(|(key, list)| (key.as_str(), list))
    }

    /// Parse `{"PORT": "required|int", "MODE": ["required", "equal:prod"]}`.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}

impl<K, L> FromIterator<(K, L)> for RuleSpec
where
    K: Into<String>,
    L: Into<RuleList>,
{
    fn from_iter<I: IntoIterator<Item = (K, L)>>(iter: I) -> Self {
        let mut spec = Self::new();
        for (key, list) in iter {
            spec.insert(key, list);
        }
        spec
    }
}
