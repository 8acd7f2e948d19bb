//! Multi-section intake form: schema, field store, validation, and the
//! wizard state machine that ties them together.

pub mod schema;
pub mod store;
pub mod validator;
pub mod value;
pub mod wizard;

pub use schema::{ChoiceOption, FieldDescriptor, FieldKind, FormSchema, Rule, SectionDescriptor};
pub use store::{FieldStore, FieldValues};
pub use validator::SectionValidator;
pub use value::FieldValue;
pub use wizard::{Navigation, SubmissionStatus, SubmitError, WizardController, WizardState};
