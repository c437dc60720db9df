use crate::config::Messages;
use thiserror::Error;

/// Form input that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Ticker,
    StartDate,
    EndDate,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Ticker => "ticker",
            FormField::StartDate => "start_date",
            FormField::EndDate => "end_date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field {}", .0.as_str())]
    MissingField(FormField),
    #[error("start date {start} is not before end date {end}")]
    InvalidRange { start: String, end: String },
    #[error("{} is not a valid YYYY-MM-DD date: {value}", .field.as_str())]
    InvalidDate { field: FormField, value: String },
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("prediction request failed with status {status}: {message}")]
    Request { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed prediction response: {0}")]
    MalformedResponse(String),
}

impl SubmitError {
    /// Text shown in the error banner, without the failure marker.
    pub fn user_message(&self, messages: &Messages) -> String {
        match self {
            SubmitError::Validation(ValidationError::MissingField(_)) => {
                messages.missing_fields.clone()
            }
            SubmitError::Validation(ValidationError::InvalidRange { .. }) => {
                messages.invalid_range.clone()
            }
            SubmitError::Validation(ValidationError::InvalidDate { .. }) => {
                messages.invalid_date.clone()
            }
            SubmitError::Request { message, .. } => message.clone(),
            SubmitError::Transport(message) => message.clone(),
            SubmitError::MalformedResponse(message) => {
                format!("{}: {}", messages.malformed_response, message)
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SubmitError::Validation(_))
    }
}

impl From<reqwest::Error> for SubmitError {
    fn from(err: reqwest::Error) -> Self {
        SubmitError::Transport(err.to_string())
    }
}
