//! Environment variable validation.
//!
//! Checks environment values against pipe-separated rule strings such as
//! `"required|int|min:1|max:65535"`. The `int` and `bool` rules coerce the
//! stored value in place; the first failing rule aborts with a
//! [`ValidationError`].
//!
//! ```
//! use envrules_core::{validate, EnvValue, EnvironmentStore, MemoryStore, RuleSpec};
//!
//! let mut store = MemoryStore::new().with("PORT", "8080");
//! let rules = RuleSpec::new().rule("PORT", "required|int|min:1|max:65535");
//!
//! validate(&mut store, &rules).unwrap();
//! assert_eq!(store.get("PORT"), EnvValue::Int(8080));
//! ```

pub mod error;
pub mod evaluator;
pub mod rules;
pub mod store;
pub mod value;

pub use error::{ErrorKind, ValidationError};
pub use evaluator::{known_rules, validate, validate_env, Validator};
pub use rules::{Directive, RuleList, RuleSpec};
pub use store::{EnvironmentStore, MemoryStore, ProcessEnv};
pub use value::EnvValue;
