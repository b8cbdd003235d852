//! Log sanitising.
//!
//! Anything that may carry user input or secrets is wrapped in [`Masked`]
//! before it reaches a `tracing` macro, so `password=...`, `"token": "..."`
//! and similar pairs are written out as `****`.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static SENSITIVE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)("?(?:password|token|secret|key|email)"?\s*[:=]\s*)("[^"]*"|'[^']*'|[^"'\s,;}&]+)"#,
    )
    .expect("valid regex")
});

/// Replace the value of every sensitive `key=value` / `"key": "value"` pair.
pub fn mask(message: &str) -> String {
    SENSITIVE_PAIR
        .replace_all(message, |caps: &Captures| {
            let value = &caps[2];
            let masked = match value.chars().next() {
                Some(quote @ ('"' | '\'')) => format!("{quote}****{quote}"),
                _ => "****".to_owned(),
            };
            format!("{}{}", &caps[1], masked)
        })
        .into_owned()
}

/// Display adapter that masks the wrapped value.
pub struct Masked<T>(pub T);

impl<T: fmt::Display> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&mask(&self.0.to_string()))
    }
}
