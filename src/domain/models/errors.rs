use thiserror::Error;

/// Rejected learner input. Raised before any request is made.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Verification codes are exactly 4 digits.")]
    Checkcode,
    #[error("Please enter a value before submitting.")]
    EmptyInput,
    #[error("'{0}' is not one of the offered options.")]
    UnknownOption(String),
    #[error("This purchase has to be completed before the lesson can continue.")]
    NotDismissable,
    #[error("That answer does not fit the current question.")]
    Mismatch,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Login required: {0}")]
    Unauthorized(String),
    #[error("Request failed with code {code}: {message}")]
    Server { code: i64, message: String },
}
