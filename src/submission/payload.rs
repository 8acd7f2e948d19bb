//! Projection of the field store into the JSON body a receiver expects.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::form::store::FieldValues;
use crate::form::value::{non_blank_entries, FieldValue};

/// One step of the store → payload projection.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadRule {
    /// Copies a field under a new name. Text is trimmed, lists lose blanks.
    Copy { from: &'static str, to: &'static str },
    /// Gathers parallel text fields into one list, skipping blank ones.
    Collect {
        from: Vec<&'static str>,
        to: &'static str,
    },
    /// Copies a list field, dropping blank entries.
    FilterList { from: &'static str, to: &'static str },
    /// Explodes a delimited text field into a list of trimmed entries.
    Split {
        from: &'static str,
        to: &'static str,
        separator: char,
    },
    /// Copies a URL field, adding `https://` when no scheme was typed.
    NormalizeUrl { from: &'static str, to: &'static str },
    /// Emits a fixed value.
    Constant { to: &'static str, value: Value },
    /// Emits the submission time as RFC 3339 UTC.
    Timestamp { to: &'static str },
}

impl PayloadRule {
    pub fn copy(from: &'static str, to: &'static str) -> Self {
        PayloadRule::Copy { from, to }
    }

    /// Copies a field under its own name.
    pub fn same(key: &'static str) -> Self {
        PayloadRule::Copy { from: key, to: key }
    }

    fn apply(&self, fields: &FieldValues, now: DateTime<Utc>, body: &mut Map<String, Value>) {
        match self {
            PayloadRule::Copy { from, to } => {
                let value = match fields.get(*from) {
                    Some(FieldValue::List(items)) => string_list(non_blank_entries(items)),
                    Some(other) => Value::String(text_of(Some(other)).trim().to_string()),
                    None => Value::String(String::new()),
                };
                body.insert(to.to_string(), value);
            }
            PayloadRule::Collect { from, to } => {
                let entries: Vec<String> = from
                    .iter()
                    .map(|key| text_of(fields.get(*key)).trim())
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string)
                    .collect();
                body.insert(to.to_string(), string_list(entries));
            }
            PayloadRule::FilterList { from, to } => {
                let entries = fields
                    .get(*from)
                    .and_then(FieldValue::as_list)
                    .map(non_blank_entries)
                    .unwrap_or_default();
                body.insert(to.to_string(), string_list(entries));
            }
            PayloadRule::Split {
                from,
                to,
                separator,
            } => {
                let entries: Vec<String> = text_of(fields.get(*from))
                    .split(*separator)
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string)
                    .collect();
                body.insert(to.to_string(), string_list(entries));
            }
            PayloadRule::NormalizeUrl { from, to } => {
                body.insert(
                    to.to_string(),
                    Value::String(normalize_url(text_of(fields.get(*from)))),
                );
            }
            PayloadRule::Constant { to, value } => {
                body.insert(to.to_string(), value.clone());
            }
            PayloadRule::Timestamp { to } => {
                body.insert(
                    to.to_string(),
                    Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
                );
            }
        }
    }
}

/// Ordered list of [`PayloadRule`]s. Later rules overwrite earlier keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadProjection {
    rules: Vec<PayloadRule>,
}

impl PayloadProjection {
    pub fn new(rules: Vec<PayloadRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PayloadRule] {
        &self.rules
    }

    /// Builds a fresh payload. Pure: the clock is passed in.
    pub fn project(&self, fields: &FieldValues, now: DateTime<Utc>) -> SubmissionPayload {
        let mut body = Map::new();
        for rule in &self.rules {
            rule.apply(fields, now, &mut body);
        }
        SubmissionPayload { body }
    }
}

/// Read-only JSON object sent to the receiving endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SubmissionPayload {
    body: Map<String, Value>,
}

impl SubmissionPayload {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.body.clone())
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

fn text_of(value: Option<&FieldValue>) -> &str {
    value.and_then(FieldValue::as_text).unwrap_or("")
}

fn string_list(entries: Vec<String>) -> Value {
    Value::Array(entries.into_iter().map(Value::String).collect())
}

fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields(entries: &[(&str, FieldValue)]) -> FieldValues {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn collect_drops_blank_competitors() {
        let values = fields(&[
            ("competitor1", FieldValue::text("Acme Inc")),
            ("competitor2", FieldValue::text("")),
            ("competitor3", FieldValue::text("  ")),
        ]);
        let projection = PayloadProjection::new(vec![PayloadRule::Collect {
            from: vec!["competitor1", "competitor2", "competitor3"],
            to: "competitors",
        }]);

        let payload = projection.project(&values, fixed_now());
        assert_eq!(payload.get("competitors"), Some(&json!(["Acme Inc"])));
    }

    #[test]
    fn copy_renames_and_trims() {
        let values = fields(&[("companyName", FieldValue::text("  Acme  "))]);
        let projection = PayloadProjection::new(vec![PayloadRule::copy("companyName", "name")]);

        let payload = projection.project(&values, fixed_now());
        assert_eq!(payload.get("name"), Some(&json!("Acme")));
        assert!(payload.get("companyName").is_none());
    }

    #[test]
    fn choices_go_on_the_wire_as_bare_strings() {
        let values = fields(&[("industry", FieldValue::choice("Healthcare"))]);
        let projection = PayloadProjection::new(vec![PayloadRule::same("industry")]);

        let payload = projection.project(&values, fixed_now());
        assert_eq!(payload.to_value(), json!({"industry": "Healthcare"}));
    }

    #[test]
    fn copied_lists_lose_blank_entries() {
        let values = fields(&[(
            "proof_assets",
            FieldValue::list(["https://a.example", "", "https://b.example"]),
        )]);
        let projection = PayloadProjection::new(vec![
            PayloadRule::same("proof_assets"),
            PayloadRule::FilterList {
                from: "proof_assets",
                to: "filtered",
            },
        ]);

        let payload = projection.project(&values, fixed_now());
        let expected = json!(["https://a.example", "https://b.example"]);
        assert_eq!(payload.get("proof_assets"), Some(&expected));
        assert_eq!(payload.get("filtered"), Some(&expected));
    }

    #[test]
    fn split_explodes_comma_separated_text() {
        let values = fields(&[(
            "forbidden_phrases",
            FieldValue::text("cheap, , guaranteed results ,free"),
        )]);
        let projection = PayloadProjection::new(vec![PayloadRule::Split {
            from: "forbidden_phrases",
            to: "forbidden_phrases",
            separator: ',',
        }]);

        let payload = projection.project(&values, fixed_now());
        assert_eq!(
            payload.get("forbidden_phrases"),
            Some(&json!(["cheap", "guaranteed results", "free"]))
        );
    }

    #[test]
    fn urls_gain_a_scheme_when_missing() {
        assert_eq!(normalize_url("acme.com"), "https://acme.com");
        assert_eq!(normalize_url(" HTTP://acme.com "), "HTTP://acme.com");
        assert_eq!(normalize_url("https://acme.com"), "https://acme.com");
        assert_eq!(normalize_url("   "), "");
    }

    #[test]
    fn constants_and_timestamps_are_emitted() {
        let projection = PayloadProjection::new(vec![
            PayloadRule::Constant {
                to: "source",
                value: json!("w3-website-speed-to-lead"),
            },
            PayloadRule::Timestamp { to: "timestamp" },
        ]);

        let payload = projection.project(&FieldValues::new(), fixed_now());
        assert_eq!(payload.get("source"), Some(&json!("w3-website-speed-to-lead")));
        assert_eq!(
            payload.get("timestamp"),
            Some(&json!("2025-03-14T09:30:00.000Z"))
        );
    }

    #[test]
    fn projection_is_pure() {
        let values = fields(&[("email", FieldValue::text("a@b.co"))]);
        let projection = PayloadProjection::new(vec![PayloadRule::same("email")]);
        let first = projection.project(&values, fixed_now());
        let second = projection.project(&values, fixed_now());
        assert_eq!(first, second);
        assert_eq!(values.get("email"), Some(&FieldValue::text("a@b.co")));
    }
}
