//! RFC 822 style message writer used for `PKG-INFO`.
//!
//! Headers with the same name are grouped at the position where the name
//! first appeared. Empty values are dropped. Multi-line values are folded
//! with an 8-space continuation indent, and an optional body follows a
//! blank line.

use indexmap::IndexMap;
use std::fmt;

const CONTINUATION_INDENT: &str = "        ";

/// An ordered collection of headers plus an optional body.
///
/// # Examples
///
/// ```
/// use sdistr_core::metadata::rfc822::Rfc822Message;
///
/// let mut msg = Rfc822Message::new();
/// msg.set("Name", "demo");
/// msg.set("Classifier", "A");
/// msg.set("Version", "0.1.0");
/// msg.set("Classifier", "B");
/// msg.set("Summary", "");
///
/// assert_eq!(
///     msg.to_string(),
///     "Name: demo\nClassifier: A\nClassifier: B\nVersion: 0.1.0\n"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rfc822Message {
    headers: IndexMap<String, Vec<String>>,
    body: Option<String>,
}

impl Rfc822Message {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header value. Empty values are ignored.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.headers.entry(name.to_string()).or_default().push(value);
    }

    /// Sets the message body. An empty body is treated as no body.
    pub fn set_body(&mut self, body: impl Into<String>) {
        let body = body.into();
        self.body = (!body.is_empty()).then_some(body);
    }

    /// Returns all values recorded for `name`, in insertion order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.headers.get(name).map_or(&[], Vec::as_slice)
    }

    /// Returns the first value recorded for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Returns the body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Serializes the message to UTF-8 bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Rfc822Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, values) in &self.headers {
            for value in values {
                let mut lines = value.trim_matches('\n').split('\n');
                writeln!(f, "{name}: {}", lines.next().unwrap_or_default())?;
                for line in lines {
                    writeln!(f, "{CONTINUATION_INDENT}{line}")?;
                }
            }
        }
        if let Some(body) = &self.body {
            write!(f, "\n{body}")?;
        }
        Ok(())
    }
}
