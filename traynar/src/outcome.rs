use std::fmt;

pub const TIMEOUT_MESSAGE: &str = "Server timeout. Try again.";
pub const SERVER_ERROR_MESSAGE: &str = "Something went wrong. Try again later.";

/// The single classified result of one credential submission.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Outcome {
    Success(String),
    /// Rejected input, one message per problem, in the order the server listed them
    ValidationError(Vec<String>),
    Conflict(String),
    ServerError,
    GenericFailure(String),
    Timeout,
    NetworkError,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Human readable message; validation messages are joined one per line.
    ///
    /// `NetworkError` has no message of its own, the wording depends on the endpoint.
    pub fn message(&self) -> Option<String> {
        match self {
            Outcome::Success(msg) | Outcome::Conflict(msg) | Outcome::GenericFailure(msg) => {
                Some(msg.clone())
            }
            Outcome::ValidationError(msgs) => Some(msgs.join("\n")),
            Outcome::ServerError => Some(SERVER_ERROR_MESSAGE.to_string()),
            Outcome::Timeout => Some(TIMEOUT_MESSAGE.to_string()),
            Outcome::NetworkError => None,
        }
    }

    /// Short machine name of the variant, used in logs and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::ValidationError(_) => "validation_error",
            Outcome::Conflict(_) => "conflict",
            Outcome::ServerError => "server_error",
            Outcome::GenericFailure(_) => "generic_failure",
            Outcome::Timeout => "timeout",
            Outcome::NetworkError => "network_error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => write!(f, "{}: {}", self.kind(), msg),
            None => write!(f, "{}", self.kind()),
        }
    }
}

/// A blocking modal message shown to the user.
#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: &str, message: &str) -> Self {
        Alert {
            title: title.to_string(),
            message: message.to_string(),
        }
    }
}

#[test]
fn test_outcome_message() {
    let outcome = Outcome::ValidationError(vec![
        "Email invalid".to_string(),
        "Password too short".to_string(),
    ]);
    assert_eq!(
        outcome.message().unwrap(),
        "Email invalid\nPassword too short"
    );
    assert_eq!(Outcome::ServerError.message().unwrap(), SERVER_ERROR_MESSAGE);
    assert_eq!(Outcome::NetworkError.message(), None);
    assert!(Outcome::Success("ok".to_string()).is_success());
    assert!(!Outcome::Timeout.is_success());
    assert_eq!(
        Outcome::Conflict("User already exists".to_string()).to_string(),
        "conflict: User already exists"
    );
}
