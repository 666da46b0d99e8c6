//! Caller-supplied operation options.
//!
//! Options are loosely typed: callers may pass strings, booleans, or numbers.
//! Only a handful of keys are interpreted by the registry itself (see
//! [`crate::reserved`]); everything else is handed to the driver untouched.

use std::collections::BTreeMap;

use serde_json::Value;

/// Loosely typed option map passed to create, update, and delete.
pub type Options = BTreeMap<String, Value>;

/// A non-blank string option.
pub fn string_option<'a>(options: &'a Options, key: &str) -> Option<&'a str> {
    options
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// A boolean flag: `true`, `"true"`, `"1"`, or `1` count as set.
pub fn flag_option(options: &Options, key: &str) -> bool {
    match options.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.as_str(), "1" | "true"),
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(pairs: &[(&str, Value)]) -> Options {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn string_option_skips_blank_and_non_strings() {
        let opts = options(&[
            ("drf", json!("memory")),
            ("drid", json!("  ")),
            ("drv", json!(1)),
        ]);
        assert_eq!(string_option(&opts, "drf"), Some("memory"));
        assert_eq!(string_option(&opts, "drid"), None);
        assert_eq!(string_option(&opts, "drv"), None);
        assert_eq!(string_option(&opts, "missing"), None);
    }

    #[test]
    fn flag_option_accepts_common_spellings() {
        assert!(flag_option(&options(&[("m", json!(true))]), "m"));
        assert!(flag_option(&options(&[("m", json!("1"))]), "m"));
        assert!(flag_option(&options(&[("m", json!("true"))]), "m"));
        assert!(flag_option(&options(&[("m", json!(1))]), "m"));
        assert!(!flag_option(&options(&[("m", json!(false))]), "m"));
        assert!(!flag_option(&options(&[("m", json!("yes"))]), "m"));
        assert!(!flag_option(&Options::new(), "m"));
    }
}
