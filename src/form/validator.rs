use crate::form::schema::{FormSchema, Rule};
use crate::form::store::FieldValues;
use crate::form::value::FieldValue;

/// Evaluates a section's required-field rules against a set of field values.
///
/// Evaluation is always fresh: nothing is cached between calls, since users
/// may go back and change earlier answers at any time.
#[derive(Debug, Clone, Copy)]
pub struct SectionValidator<'a> {
    schema: &'a FormSchema,
}

impl<'a> SectionValidator<'a> {
    pub fn new(schema: &'a FormSchema) -> Self {
        Self { schema }
    }

    /// Whether every rule of the 1-based `section` holds.
    ///
    /// Section indexes come from the wizard controller, which keeps them in
    /// range; anything else is a programming error.
    pub fn is_section_valid(&self, section: usize, fields: &FieldValues) -> bool {
        let Some(descriptor) = self.schema.section(section) else {
            debug_assert!(
                false,
                "form `{}` has no section {}",
                self.schema.name(),
                section
            );
            return false;
        };
        descriptor
            .rules
            .iter()
            .all(|rule| self.is_satisfied(rule, fields))
    }

    /// Labels describing every unsatisfied rule of `section`, in rule order.
    pub fn missing_fields(&self, section: usize, fields: &FieldValues) -> Vec<String> {
        let Some(descriptor) = self.schema.section(section) else {
            debug_assert!(
                false,
                "form `{}` has no section {}",
                self.schema.name(),
                section
            );
            return Vec::new();
        };
        descriptor
            .rules
            .iter()
            .filter(|rule| !self.is_satisfied(rule, fields))
            .map(|rule| self.describe(rule))
            .collect()
    }

    fn is_satisfied(&self, rule: &Rule, fields: &FieldValues) -> bool {
        match rule {
            Rule::Required(key) => !text(fields, key).trim().is_empty(),
            Rule::AnyOf(keys) => keys
                .iter()
                .any(|key| fields.get(*key).is_some_and(|value| !value.is_blank())),
            Rule::Selected(key) => {
                let value = text(fields, key);
                !value.is_empty()
                    && self.schema.field(key).is_some_and(|field| {
                        field
                            .kind
                            .options()
                            .iter()
                            .any(|option| option.value == value)
                    })
            }
            Rule::NonEmptyList(key) => fields
                .get(*key)
                .and_then(FieldValue::as_list)
                .is_some_and(|items| items.iter().any(|item| !item.trim().is_empty())),
            Rule::MinLength(key, min) => text(fields, key).trim().chars().count() >= *min,
        }
    }

    fn describe(&self, rule: &Rule) -> String {
        let label = |key: &str| {
            self.schema
                .field(key)
                .map(|field| field.label)
                .unwrap_or("unknown field")
        };
        match rule {
            Rule::Required(key) | Rule::Selected(key) | Rule::NonEmptyList(key) => {
                label(*key).to_string()
            }
            Rule::AnyOf(keys) => keys
                .iter()
                .map(|key| label(*key))
                .collect::<Vec<_>>()
                .join(" or "),
            Rule::MinLength(key, min) => format!("{} (at least {} characters)", label(*key), min),
        }
    }
}

fn text<'v>(fields: &'v FieldValues, key: &str) -> &'v str {
    fields
        .get(key)
        .and_then(FieldValue::as_text)
        .unwrap_or("")
}
