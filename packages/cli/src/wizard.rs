//! Multi-step form navigation.
//!
//! Steps run strictly in order. Moving forward requires the current step's
//! fields to validate; moving back never does. Submission happens only
//! from the consent step and validates the whole form first.

use intake_common::application::Field;
use intake_common::response::SubmissionReceipt;
use intake_common::{ApplicationForm, ValidationErrors, validate_fields, validate_form};

use crate::client::{Attachment, AttachmentError, SubmitError, Submitter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Introduction,
    StudentDetails,
    StartupOverview,
    SolutionMarket,
    FacultyMentor,
    Resources,
    Consent,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Introduction,
        Step::StudentDetails,
        Step::StartupOverview,
        Step::SolutionMarket,
        Step::FacultyMentor,
        Step::Resources,
        Step::Consent,
    ];

    /// 1-based position.
    pub fn number(self) -> usize {
        Step::ALL.iter().position(|s| *s == self).unwrap_or(0) + 1
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Introduction => "Get Started",
            Step::StudentDetails => "Student Details",
            Step::StartupOverview => "Startup Overview",
            Step::SolutionMarket => "Solution & Market",
            Step::FacultyMentor => "Faculty Mentor",
            Step::Resources => "Resources",
            Step::Consent => "Consent",
        }
    }

    /// Fields validated before leaving this step.
    pub fn fields(self) -> &'static [Field] {
        match self {
            Step::Introduction => &[],
            Step::StudentDetails => &[
                Field::FullName,
                Field::RegisterNumber,
                Field::ContactNumber,
                Field::Email,
                Field::SchoolDepartment,
                Field::YearOfStudy,
            ],
            Step::StartupOverview => &[
                Field::StartupName,
                Field::ProblemStatement,
                Field::ProposedSolution,
            ],
            Step::SolutionMarket => &[Field::TargetUsers, Field::Innovation, Field::PptLink],
            Step::FacultyMentor => &[
                Field::FacultyName,
                Field::FacultyDepartment,
                Field::FacultyEmail,
                Field::FacultyContact,
                Field::FacultyEmployeeId,
            ],
            Step::Resources => &[Field::Resources],
            Step::Consent => &[Field::Consent],
        }
    }

    pub fn next(self) -> Option<Step> {
        Step::ALL.get(self.number()).copied()
    }

    pub fn previous(self) -> Option<Step> {
        self.number().checked_sub(2).map(|i| Step::ALL[i])
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    Editing(Step),
    Submitting,
    Succeeded(SubmissionReceipt),
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("{0}")]
    Invalid(ValidationErrors),
    #[error("Consent is the last step; submit the application instead")]
    LastStep,
    #[error("The form can only be submitted from the consent step")]
    NotOnFinalStep,
    #[error("There is no failed submission to retry")]
    NothingToRetry,
    #[error("The form is not being edited")]
    NotEditing,
    #[error("No submission is in progress")]
    NotSubmitting,
}

pub struct FormController {
    form: ApplicationForm,
    attachment: Option<Attachment>,
    phase: Phase,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    pub fn new() -> Self {
        Self::with_form(ApplicationForm::default())
    }

    /// Starts at the introduction with `form` pre-filled.
    pub fn with_form(form: ApplicationForm) -> Self {
        Self {
            form,
            attachment: None,
            phase: Phase::Editing(Step::Introduction),
        }
    }

    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ApplicationForm {
        &mut self.form
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn step(&self) -> Option<Step> {
        match self.phase {
            Phase::Editing(step) => Some(step),
            _ => None,
        }
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Loads and checks a slide deck. A rejected file leaves any previous
    /// choice in place.
    pub fn attach(&mut self, path: impl AsRef<std::path::Path>) -> Result<(), AttachmentError> {
        self.attachment = Some(Attachment::from_path(path)?);
        Ok(())
    }

    pub fn detach(&mut self) -> Option<Attachment> {
        self.attachment.take()
    }

    /// Validates the current step's fields without moving.
    pub fn check_step(&self) -> Result<(), ValidationErrors> {
        match self.step() {
            Some(step) => validate_fields(&self.form, step.fields()),
            None => Ok(()),
        }
    }

    pub fn advance(&mut self) -> Result<Step, NavigationError> {
        let step = self.step().ok_or(NavigationError::NotEditing)?;
        let next = step.next().ok_or(NavigationError::LastStep)?;

        validate_fields(&self.form, step.fields()).map_err(NavigationError::Invalid)?;

        self.phase = Phase::Editing(next);
        Ok(next)
    }

    /// Moves back one step. Stays put on the introduction.
    pub fn retreat(&mut self) -> Result<Step, NavigationError> {
        let step = self.step().ok_or(NavigationError::NotEditing)?;
        let previous = step.previous().unwrap_or(step);
        self.phase = Phase::Editing(previous);
        Ok(previous)
    }

    /// Validates everything, then hands the form to `submitter`.
    ///
    /// Validation failures keep the consent step; a delivery failure moves to
    /// [`Phase::Failed`] with the message to show.
    pub fn submit(&mut self, submitter: &dyn Submitter) -> Result<&Phase, NavigationError> {
        self.begin_submit()?;
        let outcome = submitter.submit(&self.form, self.attachment.as_ref());
        self.finish_submit(outcome)
    }

    /// Validates the whole form and enters [`Phase::Submitting`]. Navigation
    /// and further submits are refused until the outcome is recorded.
    pub fn begin_submit(&mut self) -> Result<(), NavigationError> {
        if self.step() != Some(Step::Consent) {
            return Err(match self.phase {
                Phase::Editing(_) => NavigationError::NotOnFinalStep,
                _ => NavigationError::NotEditing,
            });
        }

        validate_form(&self.form).map_err(NavigationError::Invalid)?;

        self.phase = Phase::Submitting;
        Ok(())
    }

    pub fn finish_submit(
        &mut self,
        outcome: Result<SubmissionReceipt, SubmitError>,
    ) -> Result<&Phase, NavigationError> {
        if self.phase != Phase::Submitting {
            return Err(NavigationError::NotSubmitting);
        }
        self.phase = match outcome {
            Ok(receipt) => Phase::Succeeded(receipt),
            Err(e) => Phase::Failed(e.to_string()),
        };
        Ok(&self.phase)
    }

    /// Returns to the consent step after a failed submission, keeping input.
    pub fn retry(&mut self) -> Result<Step, NavigationError> {
        match self.phase {
            Phase::Failed(_) => {
                self.phase = Phase::Editing(Step::Consent);
                Ok(Step::Consent)
            }
            _ => Err(NavigationError::NothingToRetry),
        }
    }
}
