pub mod application;
pub mod response;
#[cfg(feature = "object-storage")]
pub mod storage;
pub mod validation;

pub use application::{ApplicationForm, Field, ResourceItem};
pub use response::{SubmissionReceipt, SubmitResponse};
pub use validation::{FieldError, ValidationErrors, validate_fields, validate_form};
