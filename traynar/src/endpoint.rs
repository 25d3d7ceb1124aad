//! Declarative description of the two credential endpoints.
//!
//! An `Endpoint` is a route plus a table of status rules. The client posts, waits at most
//! `timeout`, and hands the status code and the (optional) JSON body to `classify`, which walks
//! the rules in order. A rule whose status matches but whose body condition fails falls through
//! to the next one; when nothing matches the result is `GenericFailure`.

use crate::config::Config;
use crate::outcome::{Alert, Outcome, SERVER_ERROR_MESSAGE, TIMEOUT_MESSAGE};
use crate::screen::Screen;
use serde_json::Value;
use std::time::Duration;

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong.";

/// How a response with a matching status code is turned into an `Outcome`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Classifier {
    /// Success, optionally only when the body's `status` field reads "success"
    Success {
        require_status_field: bool,
        default_message: &'static str,
    },
    /// `detail` is a non-empty array of objects, each with a `msg` string
    DetailMessages,
    /// `errors` is a non-empty array of strings
    ErrorList,
    Conflict { default_message: &'static str },
    ServerError,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct StatusRule {
    pub status: u16,
    pub classifier: Classifier,
}

const LOGIN_RULES: &[StatusRule] = &[
    StatusRule {
        status: 200,
        classifier: Classifier::Success {
            require_status_field: false,
            default_message: "Login successful!",
        },
    },
    StatusRule {
        status: 422,
        classifier: Classifier::DetailMessages,
    },
];

const SIGNUP_RULES: &[StatusRule] = &[
    StatusRule {
        status: 201,
        classifier: Classifier::Success {
            require_status_field: true,
            default_message: "Signup successful!",
        },
    },
    StatusRule {
        status: 409,
        classifier: Classifier::Conflict {
            default_message: "User already exists.",
        },
    },
    StatusRule {
        status: 400,
        classifier: Classifier::ErrorList,
    },
    StatusRule {
        status: 500,
        classifier: Classifier::ServerError,
    },
];

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Endpoint {
    pub name: &'static str,
    /// Path below the API host, with leading slash
    pub path: &'static str,
    pub timeout: Duration,
    pub rules: &'static [StatusRule],
    /// Where to go after `Outcome::Success`
    pub on_success: Screen,
    pub failure_title: &'static str,
    pub validation_title: &'static str,
    pub network_message: &'static str,
}

impl Endpoint {
    pub fn login(config: &Config) -> Self {
        Endpoint {
            name: "login",
            path: "/auth/login",
            timeout: config.login_timeout,
            rules: LOGIN_RULES,
            on_success: Screen::Home,
            failure_title: "Login Failed",
            validation_title: "Validation Error",
            network_message: "Unable to reach server.",
        }
    }

    pub fn signup(config: &Config) -> Self {
        Endpoint {
            name: "signup",
            path: "/auth/signup",
            timeout: config.signup_timeout,
            rules: SIGNUP_RULES,
            on_success: Screen::Congrat,
            failure_title: "Signup Failed",
            validation_title: "Invalid Input",
            network_message: "Unable to reach the server.",
        }
    }

    pub fn url(&self, host: &str) -> String {
        format!("{}{}", host.trim_end_matches('/'), self.path)
    }

    /// Maps a received response to exactly one outcome.
    pub fn classify(&self, status: u16, body: Option<&Value>) -> Outcome {
        for rule in self.rules.iter().filter(|r| r.status == status) {
            if let Some(outcome) = apply(rule.classifier, body) {
                return outcome;
            }
        }
        Outcome::GenericFailure(body_message(body).unwrap_or(GENERIC_FAILURE_MESSAGE).to_string())
    }

    pub fn alert(&self, outcome: &Outcome) -> Alert {
        let message = outcome.message();
        let message = message.as_deref();
        match outcome {
            Outcome::Success(_) => Alert::new("Success", message.unwrap_or_default()),
            Outcome::ValidationError(_) => {
                Alert::new(self.validation_title, message.unwrap_or_default())
            }
            Outcome::Conflict(_) | Outcome::GenericFailure(_) => {
                Alert::new(self.failure_title, message.unwrap_or_default())
            }
            Outcome::ServerError => Alert::new("Server Error", SERVER_ERROR_MESSAGE),
            Outcome::Timeout => Alert::new("Error", TIMEOUT_MESSAGE),
            Outcome::NetworkError => Alert::new("Network Error", self.network_message),
        }
    }
}

fn apply(classifier: Classifier, body: Option<&Value>) -> Option<Outcome> {
    match classifier {
        Classifier::Success {
            require_status_field,
            default_message,
        } => {
            if require_status_field
                && body.and_then(|b| b["status"].as_str()) != Some("success")
            {
                return None;
            }
            Some(Outcome::Success(
                body_message(body).unwrap_or(default_message).to_string(),
            ))
        }
        Classifier::DetailMessages => {
            let msgs: Vec<String> = body?["detail"]
                .as_array()?
                .iter()
                .filter_map(|e| e["msg"].as_str())
                .map(|s| s.to_string())
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(Outcome::ValidationError(msgs))
            }
        }
        Classifier::ErrorList => {
            let msgs: Vec<String> = body?["errors"]
                .as_array()?
                .iter()
                .filter_map(|e| e.as_str())
                .map(|s| s.to_string())
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(Outcome::ValidationError(msgs))
            }
        }
        Classifier::Conflict { default_message } => Some(Outcome::Conflict(
            body_message(body).unwrap_or(default_message).to_string(),
        )),
        Classifier::ServerError => Some(Outcome::ServerError),
    }
}

/// The body's `message` field, when it is a non-empty string
fn body_message(body: Option<&Value>) -> Option<&str> {
    body.and_then(|b| b["message"].as_str())
        .filter(|s| !s.is_empty())
}

#[test]
fn test_classify_login() {
    use serde_json::json;
    let login = Endpoint::login(&Config::default());

    assert_eq!(
        login.classify(200, Some(&json!({"message": "Welcome back"}))),
        Outcome::Success("Welcome back".to_string())
    );
    assert_eq!(
        login.classify(200, None),
        Outcome::Success("Login successful!".to_string())
    );
    assert_eq!(
        login.classify(200, Some(&json!({"message": ""}))),
        Outcome::Success("Login successful!".to_string())
    );
    assert_eq!(
        login.classify(
            422,
            Some(&json!({"detail": [{"msg": "Email invalid"}, {"msg": "Password too short"}]}))
        ),
        Outcome::ValidationError(vec![
            "Email invalid".to_string(),
            "Password too short".to_string()
        ])
    );
    // 422 without usable detail falls through to the generic branch
    assert_eq!(
        login.classify(422, Some(&json!({"detail": [], "message": "Unprocessable"}))),
        Outcome::GenericFailure("Unprocessable".to_string())
    );
    assert_eq!(
        login.classify(422, None),
        Outcome::GenericFailure(GENERIC_FAILURE_MESSAGE.to_string())
    );
    assert_eq!(
        login.classify(401, Some(&json!({"message": "Invalid credentials"}))),
        Outcome::GenericFailure("Invalid credentials".to_string())
    );
    // login has no dedicated server error branch
    assert_eq!(
        login.classify(500, None),
        Outcome::GenericFailure(GENERIC_FAILURE_MESSAGE.to_string())
    );
}

#[test]
fn test_classify_signup() {
    use serde_json::json;
    let signup = Endpoint::signup(&Config::default());

    assert_eq!(
        signup.classify(201, Some(&json!({"status": "success", "message": "Created"}))),
        Outcome::Success("Created".to_string())
    );
    assert_eq!(
        signup.classify(201, Some(&json!({"status": "success"}))),
        Outcome::Success("Signup successful!".to_string())
    );
    assert_eq!(
        signup.classify(201, Some(&json!({"status": "pending", "message": "Queued"}))),
        Outcome::GenericFailure("Queued".to_string())
    );
    assert_eq!(
        signup.classify(201, None),
        Outcome::GenericFailure(GENERIC_FAILURE_MESSAGE.to_string())
    );
    assert_eq!(
        signup.classify(409, Some(&json!({"message": "User already exists"}))),
        Outcome::Conflict("User already exists".to_string())
    );
    assert_eq!(
        signup.classify(409, None),
        Outcome::Conflict("User already exists.".to_string())
    );
    assert_eq!(
        signup.classify(400, Some(&json!({"errors": ["Invalid email", "Bad phone"]}))),
        Outcome::ValidationError(vec!["Invalid email".to_string(), "Bad phone".to_string()])
    );
    assert_eq!(
        signup.classify(400, Some(&json!({"errors": []}))),
        Outcome::GenericFailure(GENERIC_FAILURE_MESSAGE.to_string())
    );
    assert_eq!(
        signup.classify(500, Some(&json!({"message": "db down"}))),
        Outcome::ServerError
    );
    assert_eq!(
        signup.classify(418, Some(&json!({"message": "teapot"}))),
        Outcome::GenericFailure("teapot".to_string())
    );
}

#[test]
fn test_alerts() {
    let config = Config::default();
    let login = Endpoint::login(&config);
    let signup = Endpoint::signup(&config);

    assert_eq!(
        login.alert(&Outcome::GenericFailure("nope".to_string())),
        Alert::new("Login Failed", "nope")
    );
    assert_eq!(
        signup.alert(&Outcome::Conflict("taken".to_string())),
        Alert::new("Signup Failed", "taken")
    );
    assert_eq!(
        login.alert(&Outcome::ValidationError(vec!["a".to_string(), "b".to_string()])),
        Alert::new("Validation Error", "a\nb")
    );
    assert_eq!(
        signup.alert(&Outcome::ValidationError(vec!["a".to_string()])),
        Alert::new("Invalid Input", "a")
    );
    assert_eq!(
        login.alert(&Outcome::Timeout),
        Alert::new("Error", "Server timeout. Try again.")
    );
    assert_eq!(
        signup.alert(&Outcome::NetworkError),
        Alert::new("Network Error", "Unable to reach the server.")
    );
    assert_eq!(
        signup.alert(&Outcome::ServerError),
        Alert::new("Server Error", "Something went wrong. Try again later.")
    );
    assert_eq!(
        login.url("http://localhost:8080/"),
        "http://localhost:8080/auth/login"
    );
}
