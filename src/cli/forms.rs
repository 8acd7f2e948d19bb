//! Terminal binding for the intake wizard.
//!
//! [`FormRunner`] walks the user through the current section's fields, asks
//! what to do at the end of each section, and hands every decision to the
//! [`WizardController`]. All prompting goes through [`FormInteraction`] so
//! the flow can be scripted in tests.

use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};

use crate::cli::output;
use crate::form::schema::{FieldDescriptor, FieldKind};
use crate::form::value::FieldValue;
use crate::form::wizard::{Navigation, SubmitError, WizardController};
use crate::submission::{SubmissionClient, SubmissionError, SubmissionId, Transport};

const BACK_COMMAND: &str = ":back";
const CANCEL_COMMAND: &str = ":cancel";

/// High-level lifecycle states emitted by the form runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormResult {
    Submitted(SubmissionId),
    Cancelled,
}

/// Describes how a field prompt can be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// User supplied a concrete value.
    Value(FieldValue),
    /// Leave the current value as is.
    Keep,
    /// Go back to the previous field (or section).
    Back,
    /// Abandon the wizard.
    Cancel,
}

/// Choices offered once every field of a section has been visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionAction {
    /// Advance, or submit on the last section.
    Continue,
    /// Revisit this section's fields.
    Edit,
    /// Go to the previous section.
    Back,
    Cancel,
}

/// Status messages the runner asks the interaction to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormNotice<'a> {
    Blocked(&'a [String]),
    AtFirstSection,
    InvalidValue(String),
    Submitting,
    Submitted(&'a SubmissionId),
    SubmissionFailed(&'a SubmissionError),
}

/// Data provided to render one field prompt.
pub struct PromptContext<'a> {
    pub descriptor: &'a FieldDescriptor,
    pub current: &'a FieldValue,
    pub section: usize,
    pub total_sections: usize,
    pub section_label: &'static str,
    pub index: usize,
    pub total: usize,
}

/// Snapshot of a section shown before the user continues.
#[derive(Debug, Clone, Default)]
pub struct SectionSummary {
    pub label: &'static str,
    pub section: usize,
    pub total_sections: usize,
    pub is_final: bool,
    pub entries: Vec<(&'static str, String)>,
    pub missing: Vec<String>,
}

pub trait FormInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse;

    fn section_action(&mut self, summary: &SectionSummary) -> SectionAction;

    fn notify(&mut self, notice: FormNotice<'_>);
}

/// Drives a [`WizardController`] using a [`FormInteraction`] implementation.
pub struct FormRunner<'a, T: Transport> {
    client: &'a SubmissionClient<T>,
}

impl<'a, T: Transport> FormRunner<'a, T> {
    pub fn new(client: &'a SubmissionClient<T>) -> Self {
        Self { client }
    }

    pub async fn run<I: FormInteraction>(
        &self,
        wizard: &mut WizardController,
        interaction: &mut I,
    ) -> FormResult {
        let mut field_index = 0;
        let mut reviewing = false;

        loop {
            let section = wizard.current_descriptor().clone();

            if !reviewing && field_index < section.fields.len() {
                let key = section.fields[field_index];
                let response = {
                    let Some(descriptor) = wizard.schema().field(key) else {
                        field_index += 1;
                        continue;
                    };
                    let current = descriptor.kind.initial_value();
                    let context = PromptContext {
                        descriptor,
                        current: wizard.store().get_field(key).unwrap_or(&current),
                        section: wizard.current_section(),
                        total_sections: wizard.section_count(),
                        section_label: section.label,
                        index: field_index,
                        total: section.fields.len(),
                    };
                    interaction.prompt_field(&context)
                };

                match response {
                    PromptResponse::Value(value) => match wizard.store_mut().set_field(key, value) {
                        Ok(()) => field_index += 1,
                        Err(err) => interaction.notify(FormNotice::InvalidValue(err.to_string())),
                    },
                    PromptResponse::Keep => field_index += 1,
                    PromptResponse::Back if field_index > 0 => field_index -= 1,
                    PromptResponse::Back => match wizard.retreat() {
                        Navigation::Moved { .. } => reviewing = true,
                        _ => interaction.notify(FormNotice::AtFirstSection),
                    },
                    PromptResponse::Cancel => {
                        wizard.abandon();
                        return FormResult::Cancelled;
                    }
                }
                continue;
            }

            let summary = summarize(wizard);
            match interaction.section_action(&summary) {
                SectionAction::Continue if summary.is_final => {
                    interaction.notify(FormNotice::Submitting);
                    match wizard.submit(self.client).await {
                        Ok(id) => {
                            interaction.notify(FormNotice::Submitted(&id));
                            return FormResult::Submitted(id);
                        }
                        Err(SubmitError::ValidationBlocked { missing }) => {
                            interaction.notify(FormNotice::Blocked(&missing));
                            field_index = 0;
                            reviewing = false;
                        }
                        Err(SubmitError::Failed(err)) => {
                            interaction.notify(FormNotice::SubmissionFailed(&err));
                            reviewing = true;
                        }
                        Err(other) => {
                            interaction.notify(FormNotice::InvalidValue(other.to_string()));
                            reviewing = true;
                        }
                    }
                }
                SectionAction::Continue => match wizard.advance() {
                    Navigation::Moved { .. } => {
                        field_index = 0;
                        reviewing = false;
                    }
                    Navigation::Blocked { missing } => {
                        interaction.notify(FormNotice::Blocked(&missing));
                        field_index = 0;
                        reviewing = false;
                    }
                    Navigation::AtFinalSection | Navigation::AtFirstSection => reviewing = true,
                },
                SectionAction::Edit => {
                    field_index = 0;
                    reviewing = false;
                }
                SectionAction::Back => match wizard.retreat() {
                    Navigation::Moved { .. } => reviewing = true,
                    _ => interaction.notify(FormNotice::AtFirstSection),
                },
                SectionAction::Cancel => {
                    wizard.abandon();
                    return FormResult::Cancelled;
                }
            }
        }
    }
}

fn summarize(wizard: &WizardController) -> SectionSummary {
    let section = wizard.current_descriptor();
    let entries = section
        .fields
        .iter()
        .filter_map(|key| {
            let descriptor = wizard.schema().field(key)?;
            let value = wizard.store().get_field(key)?;
            Some((descriptor.label, display_value(descriptor, value)))
        })
        .collect();

    SectionSummary {
        label: section.label,
        section: wizard.current_section(),
        total_sections: wizard.section_count(),
        is_final: wizard.is_final_section(),
        entries,
        missing: wizard.missing_fields(),
    }
}

fn display_value(descriptor: &FieldDescriptor, value: &FieldValue) -> String {
    if value.is_blank() {
        return "[unfilled]".to_string();
    }
    match value {
        FieldValue::Text(text) => text.trim().to_string(),
        FieldValue::Choice(choice) => option_label(descriptor, choice).to_string(),
        FieldValue::List(items) => items
            .iter()
            .filter(|item| !item.trim().is_empty())
            .map(|item| option_label(descriptor, item))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn option_label<'a>(descriptor: &'a FieldDescriptor, value: &'a str) -> &'a str {
    descriptor
        .kind
        .options()
        .iter()
        .find(|option| option.value == value)
        .map(|option| option.label)
        .unwrap_or(value)
}

/// Interactive implementation backed by dialoguer prompts.
pub struct TerminalInteraction {
    theme: ColorfulTheme,
}

impl Default for TerminalInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn print_step_header(&self, context: &PromptContext<'_>) {
        if context.index == 0 {
            output::section(format!(
                "Step {} of {} – {}",
                context.section, context.total_sections, context.section_label
            ));
            output::detail(format!(
                "Type {BACK_COMMAND} to revisit the previous field or {CANCEL_COMMAND} to leave the form."
            ));
        }
        if let Some(help) = context.descriptor.help {
            output::detail(help);
        }
    }

    fn prompt_text(&self, label: &str, initial: &str) -> PromptResponse {
        match self.read_line(label, initial) {
            Ok(Some(value)) => PromptResponse::Value(FieldValue::Text(value)),
            Ok(None) => PromptResponse::Back,
            Err(response) => response,
        }
    }

    /// `Ok(None)` means the user asked to go back.
    fn read_line(&self, label: &str, initial: &str) -> Result<Option<String>, PromptResponse> {
        let input = Input::<String>::with_theme(&self.theme)
            .with_prompt(label)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()
            .map_err(|_| PromptResponse::Cancel)?;
        match input.trim() {
            BACK_COMMAND => Ok(None),
            CANCEL_COMMAND => Err(PromptResponse::Cancel),
            _ => Ok(Some(input)),
        }
    }

    fn prompt_choice(&self, context: &PromptContext<'_>) -> PromptResponse {
        let options = context.descriptor.kind.options();
        let mut items: Vec<&str> = options.iter().map(|option| option.label).collect();
        items.push("← Back");
        let current = context.current.as_text().unwrap_or("");
        let default = options
            .iter()
            .position(|option| option.value == current)
            .unwrap_or(0);

        match Select::with_theme(&self.theme)
            .with_prompt(context.descriptor.label)
            .items(&items)
            .default(default)
            .interact_opt()
        {
            Ok(Some(index)) if index < options.len() => {
                PromptResponse::Value(FieldValue::Choice(options[index].value.to_string()))
            }
            Ok(Some(_)) => PromptResponse::Back,
            Ok(None) | Err(_) => PromptResponse::Cancel,
        }
    }

    fn prompt_slots(&self, context: &PromptContext<'_>, slots: usize) -> PromptResponse {
        let existing = context.current.as_list().unwrap_or(&[]);
        let mut items = Vec::with_capacity(slots);
        for slot in 0..slots {
            let label = format!("{} #{}", context.descriptor.label, slot + 1);
            let initial = existing.get(slot).map(String::as_str).unwrap_or("");
            match self.read_line(&label, initial) {
                Ok(Some(value)) => items.push(value),
                Ok(None) => return PromptResponse::Back,
                Err(response) => return response,
            }
        }
        PromptResponse::Value(FieldValue::List(items))
    }

    fn prompt_multi(&self, context: &PromptContext<'_>) -> PromptResponse {
        let options = context.descriptor.kind.options();
        let selected = context.current.as_list().unwrap_or(&[]);
        let labels: Vec<&str> = options.iter().map(|option| option.label).collect();
        let checked: Vec<bool> = options
            .iter()
            .map(|option| selected.iter().any(|item| item == option.value))
            .collect();

        match MultiSelect::with_theme(&self.theme)
            .with_prompt(format!("{} (space to toggle, enter to confirm)", context.descriptor.label))
            .items(&labels)
            .defaults(&checked)
            .interact_opt()
        {
            Ok(Some(indexes)) => PromptResponse::Value(FieldValue::List(
                indexes
                    .into_iter()
                    .filter_map(|index| options.get(index))
                    .map(|option| option.value.to_string())
                    .collect(),
            )),
            Ok(None) => PromptResponse::Back,
            Err(_) => PromptResponse::Cancel,
        }
    }
}

impl FormInteraction for TerminalInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        self.print_step_header(context);
        match &context.descriptor.kind {
            FieldKind::Text => {
                self.prompt_text(context.descriptor.label, context.current.as_text().unwrap_or(""))
            }
            FieldKind::Choice(_) => self.prompt_choice(context),
            FieldKind::List { slots } => self.prompt_slots(context, *slots),
            FieldKind::MultiSelect(_) => self.prompt_multi(context),
        }
    }

    fn section_action(&mut self, summary: &SectionSummary) -> SectionAction {
        output::section(format!(
            "Review {} of {} – {}",
            summary.section, summary.total_sections, summary.label
        ));
        for (label, value) in &summary.entries {
            output::detail(format!("{}: {}", label, value));
        }
        if !summary.missing.is_empty() {
            output::warning(format!("Still required: {}", summary.missing.join(", ")));
        }

        let proceed = if summary.is_final { "Submit" } else { "Continue" };
        let items = [proceed, "Edit this section", "Back", "Cancel"];
        match Select::with_theme(&self.theme)
            .items(&items)
            .default(0)
            .interact_opt()
        {
            Ok(Some(0)) => SectionAction::Continue,
            Ok(Some(1)) => SectionAction::Edit,
            Ok(Some(2)) => SectionAction::Back,
            _ => SectionAction::Cancel,
        }
    }

    fn notify(&mut self, notice: FormNotice<'_>) {
        match notice {
            FormNotice::Blocked(missing) => {
                output::warning(format!("Please fill in: {}", missing.join(", ")))
            }
            FormNotice::AtFirstSection => output::warning("Already at the first section."),
            FormNotice::InvalidValue(message) => output::warning(message),
            FormNotice::Submitting => output::info("Submitting..."),
            FormNotice::Submitted(id) => output::success(format!("Submitted! Reference: {}", id)),
            FormNotice::SubmissionFailed(err) => {
                output::error(err.user_message());
                output::detail(err.to_string());
            }
        }
    }
}
