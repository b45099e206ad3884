//! `%TOKEN%` placeholder substitution
//!
//! A token is `%` + an uppercase ASCII letter + uppercase letters, digits or `_` + `%`. Any other
//! use of `%` is copied through untouched.

use std::collections::BTreeMap;

/// Token values, keyed by token name without the surrounding `%`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    values: BTreeMap<String, String>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(token.into(), value.into());
        self
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replaces every token in one pass; substituted values are not scanned again.
    ///
    /// Returns the first token without a value as `Err("%NAME%")`.
    pub fn substitute(&self, text: &str) -> Result<String, String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find('%') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match token_len(after) {
                Some(len) => {
                    let name = &after[..len];
                    match self.values.get(name) {
                        Some(value) => out.push_str(value),
                        None => return Err(format!("%{}%", name)),
                    }
                    rest = &after[len + 1..];
                }
                None => {
                    out.push('%');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        Ok(out)
    }
}

/// Length of the token name at the start of `s` when it is followed by a closing `%`.
fn token_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if !bytes.first()?.is_ascii_uppercase() {
        return None;
    }
    let len = bytes
        .iter()
        .take_while(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || **b == b'_')
        .count();
    (bytes.get(len) == Some(&b'%')).then_some(len)
}
