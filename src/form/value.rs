/// Current value of a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Free text, possibly empty.
    Text(String),
    /// One option out of a fixed set. The empty string is the placeholder.
    Choice(String),
    /// Several free-text entries (parallel slots or multi-select picks).
    List(Vec<String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn choice(value: impl Into<String>) -> Self {
        FieldValue::Choice(value.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Text content for text and choice values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) | FieldValue::Choice(value) => Some(value),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// True when the value carries no non-whitespace content.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(value) | FieldValue::Choice(value) => value.trim().is_empty(),
            FieldValue::List(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Choice(_) => "choice",
            FieldValue::List(_) => "list",
        }
    }
}

/// Non-blank entries of a list, trimmed, in their original order.
pub(crate) fn non_blank_entries<'a, I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    items
        .into_iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
