//! Environment variable sources and value coercion.

use crate::error::{EnvError, EnvResult};
use std::collections::HashMap;
use tracing::debug;

/// Source for environment variables.
///
/// Resolvers never read ambient process state directly; they take a source
/// as an explicit argument, which keeps them pure and testable. A layered
/// `.env` loader can supply its merged mapping through this trait.
pub trait EnvSource: Send + Sync {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;

    /// Check if a variable exists.
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Default environment source using std::env.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create a new map-based environment source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a one-time snapshot of the process environment.
    pub fn snapshot() -> Self {
        Self {
            vars: std::env::vars_os()
                .map(|(k, v)| {
                    (
                        k.to_string_lossy().into_owned(),
                        v.to_string_lossy().into_owned(),
                    )
                })
                .collect(),
        }
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Add multiple variables.
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars.extend(vars);
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Read a required variable, falling back to `default` when it is absent.
///
/// An empty `name` consults only the default, which enables optional-lookup
/// call patterns. A variable that is set but empty is an error even when a
/// default is given; the default substitutes only for an absent variable.
pub fn check_var(env: &impl EnvSource, name: &str, default: Option<&str>) -> EnvResult<String> {
    let value = if name.is_empty() {
        default.map(str::to_string)
    } else {
        env.get(name).or_else(|| default.map(str::to_string))
    };

    match value {
        Some(value) if !value.is_empty() => {
            debug!(var = name, url_len = value.len(), "connection variable read");
            Ok(value)
        }
        _ => Err(EnvError::MissingVar(name.to_string())),
    }
}

/// Prefixes treated as true by [`is_true`]. Case-sensitive.
const TRUE_PREFIXES: [&str; 8] = ["T", "t", "1", "on", "ok", "Y", "y", "en"];

/// Coerce a string to an integer the way query options are coerced.
///
/// Returns 0 for empty input or anything that is not all ASCII digits.
pub fn to_int(val: &str) -> i64 {
    if !val.is_empty() && val.bytes().all(|b| b.is_ascii_digit()) {
        val.parse().unwrap_or(0)
    } else {
        0
    }
}

/// Coerce a string to a boolean.
///
/// True when the value starts with one of `T`, `t`, `1`, `on`, `ok`, `Y`,
/// `y`, `en`; everything else, including the empty string, is false.
pub fn is_true(val: &str) -> bool {
    TRUE_PREFIXES.iter().any(|prefix| val.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_source() -> MapEnvSource {
        MapEnvSource::new()
            .set("DATABASE_URL", "postgres://localhost/app")
            .set("EMPTY", "")
    }

    #[test]
    fn test_check_var_present() {
        let env = test_source();
        assert_eq!(
            check_var(&env, "DATABASE_URL", None).unwrap(),
            "postgres://localhost/app"
        );
    }

    #[test]
    fn test_check_var_default() {
        let env = test_source();
        assert_eq!(
            check_var(&env, "MISSING", Some("redis://localhost")).unwrap(),
            "redis://localhost"
        );
    }

    #[test]
    fn test_check_var_missing() {
        let env = test_source();
        let err = check_var(&env, "MISSING", None).unwrap_err();
        assert!(matches!(err, EnvError::MissingVar(name) if name == "MISSING"));
    }

    #[test]
    fn test_check_var_empty_value_ignores_default() {
        // A set-but-empty variable is an error; the default only covers absence.
        let env = test_source();
        let result = check_var(&env, "EMPTY", Some("redis://localhost"));
        assert!(matches!(result, Err(EnvError::MissingVar(_))));
    }

    #[test]
    fn test_check_var_empty_name_uses_default() {
        let env = test_source();
        assert_eq!(check_var(&env, "", Some("fallback")).unwrap(), "fallback");
        assert!(check_var(&env, "", None).is_err());
    }

    #[test]
    fn test_snapshot_reads_process_env() {
        // PATH is set in any sane test environment.
        let env = MapEnvSource::snapshot();
        assert!(env.contains("PATH"));
    }

    #[test]
    fn test_to_int() {
        assert_eq!(to_int("30"), 30);
        assert_eq!(to_int("007"), 7);
        assert_eq!(to_int(""), 0);
        assert_eq!(to_int("abc"), 0);
        assert_eq!(to_int("-5"), 0);
        assert_eq!(to_int("5.5"), 0);
        assert_eq!(to_int("99999999999999999999999"), 0);
    }

    #[test]
    fn test_is_true() {
        for val in ["True", "true", "1", "10", "on", "ok", "okay", "Yes", "yes", "enabled"] {
            assert!(is_true(val), "{val} should be true");
        }
        for val in ["", "False", "false", "0", "off", "no", "disabled"] {
            assert!(!is_true(val), "{val} should be false");
        }
    }
}
