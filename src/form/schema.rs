//! Declarative description of an intake form.
//!
//! A [`FormSchema`] names every field the form holds, groups them into
//! ordered sections, and attaches the required-field [`Rule`]s each section
//! must satisfy before the wizard lets the user move on. Schemas are fixed
//! once built: sections are never added or removed mid-session.

use std::collections::{BTreeMap, HashSet};

use crate::errors::{IntakeError, Result};
use crate::form::value::FieldValue;

/// One selectable option of a choice or multi-select field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: &'static str,
    pub label: &'static str,
}

impl ChoiceOption {
    pub const fn new(value: &'static str, label: &'static str) -> Self {
        Self { value, label }
    }
}

/// Supported data kinds for form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Choice(Vec<ChoiceOption>),
    /// Fixed number of parallel free-text slots (e.g. three proof asset URLs).
    List { slots: usize },
    /// Any subset of the options, stored as a list of option values.
    MultiSelect(Vec<ChoiceOption>),
}

impl FieldKind {
    /// Value a field of this kind holds before the user touches it.
    pub fn initial_value(&self) -> FieldValue {
        match self {
            FieldKind::Text => FieldValue::Text(String::new()),
            FieldKind::Choice(_) => FieldValue::Choice(String::new()),
            FieldKind::List { slots } => FieldValue::List(vec![String::new(); *slots]),
            FieldKind::MultiSelect(_) => FieldValue::List(Vec::new()),
        }
    }

    pub fn options(&self) -> &[ChoiceOption] {
        match self {
            FieldKind::Choice(options) | FieldKind::MultiSelect(options) => options,
            _ => &[],
        }
    }

    /// Whether `value` has the shape this kind stores.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (FieldKind::Text, FieldValue::Text(_))
                | (FieldKind::Choice(_), FieldValue::Choice(_))
                | (FieldKind::List { .. }, FieldValue::List(_))
                | (FieldKind::MultiSelect(_), FieldValue::List(_))
        )
    }

    pub fn expected_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Choice(_) => "choice",
            FieldKind::List { .. } | FieldKind::MultiSelect(_) => "list",
        }
    }
}

/// Declarative description of a single form field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub help: Option<&'static str>,
}

impl FieldDescriptor {
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            help: None,
        }
    }

    pub fn text(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    pub fn choice(key: &'static str, label: &'static str, options: &[ChoiceOption]) -> Self {
        Self::new(key, label, FieldKind::Choice(options.to_vec()))
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

/// Required-field predicate attached to a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Text must contain something besides whitespace.
    Required(&'static str),
    /// At least one of the parallel fields must be filled.
    AnyOf(Vec<&'static str>),
    /// A real option must be picked, not the placeholder.
    Selected(&'static str),
    /// A list must hold at least one non-blank entry.
    NonEmptyList(&'static str),
    /// Trimmed text must be at least this many characters long.
    MinLength(&'static str, usize),
}

impl Rule {
    pub fn keys(&self) -> Vec<&'static str> {
        match self {
            Rule::Required(key)
            | Rule::Selected(key)
            | Rule::NonEmptyList(key)
            | Rule::MinLength(key, _) => vec![*key],
            Rule::AnyOf(keys) => keys.clone(),
        }
    }

    /// Whether this rule can ever hold for a field of `kind`.
    fn applies_to(&self, kind: &FieldKind) -> bool {
        match self {
            Rule::Required(_) | Rule::MinLength(..) => {
                matches!(kind, FieldKind::Text | FieldKind::Choice(_))
            }
            Rule::Selected(_) => matches!(kind, FieldKind::Choice(_)),
            Rule::NonEmptyList(_) => {
                matches!(kind, FieldKind::List { .. } | FieldKind::MultiSelect(_))
            }
            Rule::AnyOf(_) => true,
        }
    }
}

/// One step of the wizard.
#[derive(Debug, Clone)]
pub struct SectionDescriptor {
    pub label: &'static str,
    pub fields: Vec<&'static str>,
    pub rules: Vec<Rule>,
}

impl SectionDescriptor {
    pub fn new(label: &'static str, fields: &[&'static str]) -> Self {
        Self {
            label,
            fields: fields.to_vec(),
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Metadata describing a full wizard: every field and the ordered sections.
#[derive(Debug, Clone)]
pub struct FormSchema {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
    sections: Vec<SectionDescriptor>,
}

impl FormSchema {
    pub fn new(
        name: &'static str,
        fields: Vec<FieldDescriptor>,
        sections: Vec<SectionDescriptor>,
    ) -> Result<Self> {
        if sections.is_empty() {
            return Err(IntakeError::InvalidSchema(format!(
                "form `{}` declares no sections",
                name
            )));
        }

        let mut declared = HashSet::new();
        for field in &fields {
            if !declared.insert(field.key) {
                return Err(IntakeError::InvalidSchema(format!(
                    "field `{}` is declared twice",
                    field.key
                )));
            }
        }

        for section in &sections {
            let referenced = section
                .fields
                .iter()
                .copied()
                .chain(section.rules.iter().flat_map(Rule::keys));
            for key in referenced {
                if !declared.contains(key) {
                    return Err(IntakeError::InvalidSchema(format!(
                        "section `{}` references undeclared field `{}`",
                        section.label, key
                    )));
                }
            }
        }

        for section in &sections {
            for rule in &section.rules {
                for key in rule.keys() {
                    let Some(field) = fields.iter().find(|field| field.key == key) else {
                        continue;
                    };
                    if !rule.applies_to(&field.kind) {
                        return Err(IntakeError::InvalidSchema(format!(
                            "section `{}` applies {:?} to {} field `{}`, which can never pass",
                            section.label,
                            rule,
                            field.kind.expected_name(),
                            key
                        )));
                    }
                }
            }
        }

        Ok(Self {
            name,
            fields,
            sections,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Section at the 1-based ordinal `index`.
    pub fn section(&self, index: usize) -> Option<&SectionDescriptor> {
        index
            .checked_sub(1)
            .and_then(|position| self.sections.get(position))
    }

    pub fn sections(&self) -> &[SectionDescriptor] {
        &self.sections
    }

    pub fn initial_values(&self) -> BTreeMap<String, FieldValue> {
        self.fields
            .iter()
            .map(|field| (field.key.to_string(), field.kind.initial_value()))
            .collect()
    }
}
