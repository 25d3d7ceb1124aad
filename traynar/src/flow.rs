//! Screen-level submission: validation, in-flight guard, loading indicator, alert and
//! navigation around a `CredentialClient` call.

use crate::client::CredentialClient;
use crate::config::Config;
use crate::endpoint::Endpoint;
use crate::forms::{FieldErrors, LoginForm, SignupForm};
use crate::outcome::{Alert, Outcome};
use crate::screen::Navigator;
use log::{debug, info};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shows a blocking message to the user.
pub trait Alerter {
    fn alert(&self, alert: &Alert);
}

/// Shared "request pending" flag. Clones observe the same state.
#[derive(Debug, Default, Clone)]
pub struct LoadingIndicator {
    active: Arc<AtomicBool>,
}

impl LoadingIndicator {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Sets the flag if it was clear. Returns `None` while another holder has it.
    pub fn try_begin(&self) -> Option<LoadingGuard> {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| LoadingGuard {
                active: Arc::clone(&self.active),
            })
    }
}

/// Clears the loading flag when dropped, whichever way the submission ends.
#[derive(Debug)]
pub struct LoadingGuard {
    active: Arc<AtomicBool>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// What happened to one press of the submit button.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Submission {
    Completed(Outcome),
    /// Local validation failed; nothing was sent
    Invalid(FieldErrors),
    /// A request from this screen is still pending; nothing was sent
    Rejected,
}

impl Submission {
    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            Submission::Completed(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Login and signup screens share this controller; each screen instance owns one, and at most
/// one request per instance is in flight.
pub struct AuthFlow<N, A> {
    client: CredentialClient,
    login: Endpoint,
    signup: Endpoint,
    navigator: N,
    alerter: A,
    loading: LoadingIndicator,
}

impl<N: Navigator, A: Alerter> AuthFlow<N, A> {
    pub fn new(config: &Config, client: CredentialClient, navigator: N, alerter: A) -> Self {
        AuthFlow {
            client,
            login: Endpoint::login(config),
            signup: Endpoint::signup(config),
            navigator,
            alerter,
            loading: LoadingIndicator::default(),
        }
    }

    /// Handle for rendering the spinner and disabling the submit button
    pub fn loading(&self) -> LoadingIndicator {
        self.loading.clone()
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn alerter(&self) -> &A {
        &self.alerter
    }

    pub async fn submit_login(&self, identifier: &str, password: &str) -> Submission {
        let request = LoginForm::new(identifier, password).to_request();
        debug!("login submit identifier={}", request.identifier);
        self.run(&self.login, &request).await
    }

    pub async fn submit_signup(&self, form: &SignupForm) -> Submission {
        match form.to_request() {
            Ok(request) => self.run(&self.signup, &request).await,
            Err(errors) => {
                info!("signup form has {} invalid field(s), not sending", errors.len());
                Submission::Invalid(errors)
            }
        }
    }

    async fn run<B: Serialize>(&self, endpoint: &Endpoint, body: &B) -> Submission {
        let guard = match self.loading.try_begin() {
            Some(guard) => guard,
            None => {
                info!("{} already in flight, ignoring submit", endpoint.name);
                return Submission::Rejected;
            }
        };
        let outcome = self.client.submit(endpoint, body).await;
        // spinner goes away before the alert, which may block until dismissed
        drop(guard);
        self.alerter.alert(&endpoint.alert(&outcome));
        if outcome.is_success() {
            self.navigator.navigate(endpoint.on_success);
        }
        Submission::Completed(outcome)
    }
}

#[test]
fn test_loading_guard() {
    let loading = LoadingIndicator::default();
    let observer = loading.clone();
    assert!(!observer.is_active());
    {
        let _guard = loading.try_begin().unwrap();
        assert!(observer.is_active());
        assert!(loading.try_begin().is_none());
    }
    assert!(!observer.is_active());
    assert!(loading.try_begin().is_some());
    assert!(!observer.is_active());
}
