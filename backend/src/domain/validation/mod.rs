//! Declarative request body validation.
//!
//! A [`RuleSet`] lists fields in order, each with an ordered list of
//! [`Rule`]s. Field names may contain one `*` segment (`file_uploads.*.name`)
//! which expands to one field per element of the array at that position.
//!
//! Evaluation mirrors the conventions clients of this API already rely on:
//!
//! - a missing, null, or blank value only fails `required`; every other rule
//!   is skipped for it;
//! - each field reports its first failing rule;
//! - when several fields fail, the error carries the message of the **last**
//!   failing field in declaration order.

mod rules;

pub use rules::Rule;

use serde_json::Value;
use tracing::error;

use super::Error;
use super::ports::ReferenceLookup;
use rules::{as_integer, as_lookup_text, is_blank, size_kind};

/// Human-readable attribute name used in messages.
///
/// # Examples
/// ```
/// use booking_backend::domain::attribute_label;
///
/// assert_eq!(attribute_label("customer_name"), "customer name");
/// ```
#[must_use]
pub fn attribute_label(field: &str) -> String {
    field.replace('_', " ")
}

/// Ordered field rules for one request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    fields: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    /// Start an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field and its rules.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push((name.into(), rules.into_iter().collect()));
        self
    }

    /// Concrete `(path, rules)` pairs after wildcard expansion.
    fn expand<'a>(&'a self, body: &Value) -> Vec<(String, &'a [Rule])> {
        let mut expanded = Vec::new();
        for (name, rules) in &self.fields {
            match name.split_once(".*") {
                None => expanded.push((name.clone(), rules.as_slice())),
                Some((head, tail)) => {
                    let count = lookup(body, head)
                        .and_then(Value::as_array)
                        .map_or(0, Vec::len);
                    for index in 0..count {
                        expanded.push((format!("{head}.{index}{tail}"), rules.as_slice()));
                    }
                }
            }
        }
        expanded
    }
}

/// Resolve a dotted path, treating numeric segments as array indices.
#[must_use]
pub fn lookup<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(body, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index)),
        _ => None,
    })
}

/// Borrow a string field of a validated body.
///
/// # Errors
///
/// Returns a validation [`Error`] when the field is absent or not a string.
pub fn field_str<'a>(body: &'a Value, field: &str) -> Result<&'a str, Error> {
    lookup(body, field)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::validation(format!("The {} must be a string.", attribute_label(field))))
}

/// Read an integer field of a validated body, accepting integer strings.
///
/// # Errors
///
/// Returns a validation [`Error`] when the field is absent or not an integer.
pub fn field_i64(body: &Value, field: &str) -> Result<i64, Error> {
    lookup(body, field).and_then(as_integer).ok_or_else(|| {
        Error::validation(format!(
            "The {} must be an integer.",
            attribute_label(field)
        ))
    })
}

/// Applies a [`RuleSet`] to a request body.
pub struct Validator<'a> {
    lookup: &'a dyn ReferenceLookup,
}

impl<'a> Validator<'a> {
    /// Build a validator resolving `exists`/`unique` through `lookup`.
    #[must_use]
    pub fn new(lookup: &'a dyn ReferenceLookup) -> Self {
        Self { lookup }
    }

    /// Validate `body` against `rules`.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Error`] carrying the last failing field's first
    /// message, or a service-unavailable error when a lookup fails.
    pub async fn validate(&self, rules: &RuleSet, body: &Value) -> Result<(), Error> {
        let mut reported = None;
        for (path, field_rules) in rules.expand(body) {
            if let Some(message) = self.first_failure(&path, field_rules, body).await? {
                reported = Some(message);
            }
        }
        match reported {
            Some(message) => Err(Error::validation(message)),
            None => Ok(()),
        }
    }

    async fn first_failure(
        &self,
        path: &str,
        rules: &[Rule],
        body: &Value,
    ) -> Result<Option<String>, Error> {
        let attribute = attribute_label(path);
        let size = size_kind(rules);
        let value = match lookup(body, path) {
            Some(value) if !is_blank(Some(value)) => value,
            _ => {
                return Ok(rules
                    .iter()
                    .find(|rule| matches!(rule, Rule::Required))
                    .map(|rule| rule.message(&attribute, size)));
            }
        };
        for rule in rules {
            let passes = match rule.check_local(value, size) {
                Some(passes) => passes,
                None => self.check_stored(rule, value).await?,
            };
            if !passes {
                return Ok(Some(rule.message(&attribute, size)));
            }
        }
        Ok(None)
    }

    async fn check_stored(&self, rule: &Rule, value: &Value) -> Result<bool, Error> {
        let Some(text) = as_lookup_text(value) else {
            return Ok(false);
        };
        let (column, except_id, want_existing) = match rule {
            Rule::Exists(column) => (*column, None, true),
            Rule::Unique { column, except_id } => (*column, *except_id, false),
            _ => return Ok(true),
        };
        let exists = self
            .lookup
            .value_exists(column, &text, except_id)
            .await
            .map_err(|err| {
                error!(error = %err, %column, "validation lookup failed");
                Error::service_unavailable("Validation lookup is unavailable.")
            })?;
        Ok(exists == want_existing)
    }
}
