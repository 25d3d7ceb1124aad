use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;
use traynar::*;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingNavigator {
    visited: Mutex<Vec<Screen>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, screen: Screen) {
        self.visited.lock().unwrap().push(screen);
    }
}

#[derive(Default)]
struct RecordingAlerter {
    shown: Mutex<Vec<Alert>>,
}

impl Alerter for RecordingAlerter {
    fn alert(&self, alert: &Alert) {
        self.shown.lock().unwrap().push(alert.clone());
    }
}

/// Notes whether the loading indicator was still on when each alert was shown.
#[derive(Default)]
struct LoadingAwareAlerter {
    loading: Mutex<Option<LoadingIndicator>>,
    loading_when_shown: Mutex<Vec<bool>>,
}

impl Alerter for LoadingAwareAlerter {
    fn alert(&self, _alert: &Alert) {
        let active = self
            .loading
            .lock()
            .unwrap()
            .as_ref()
            .map(|l| l.is_active())
            .unwrap();
        self.loading_when_shown.lock().unwrap().push(active);
    }
}

type TestFlow = AuthFlow<RecordingNavigator, RecordingAlerter>;

fn flow_for(host: &str, timeout: Duration) -> TestFlow {
    let mut config = Config::default().with_api_host(host).unwrap();
    config.login_timeout = timeout;
    config.signup_timeout = timeout;
    let client = CredentialClient::from_config(&config).unwrap();
    AuthFlow::new(
        &config,
        client,
        RecordingNavigator::default(),
        RecordingAlerter::default(),
    )
}

fn flow(server: &MockServer) -> TestFlow {
    flow_for(&server.uri(), Duration::from_secs(5))
}

fn visited(flow: &TestFlow) -> Vec<Screen> {
    flow.navigator().visited.lock().unwrap().clone()
}

fn alerts(flow: &TestFlow) -> Vec<Alert> {
    flow.alerter().shown.lock().unwrap().clone()
}

fn valid_signup() -> SignupForm {
    let mut form = SignupForm::new("+91");
    form.username = "drreed".to_string();
    form.first_name = "Evelyn".to_string();
    form.last_name = "Reed".to_string();
    form.email = "evelyn@brightsmiles.example".to_string();
    form.phone = "9876543210".to_string();
    form.location = "Pune".to_string();
    form
}

/// Checks the invariants every completed submission must hold, and returns the outcome.
fn completed(flow: &TestFlow, submission: Submission) -> Outcome {
    assert!(!flow.loading().is_active(), "loading indicator left set");
    assert_eq!(alerts(flow).len(), 1, "exactly one alert per submission");
    match submission {
        Submission::Completed(outcome) => outcome,
        other => panic!("expected a completed submission, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"identifier": "jane@example.com", "password": "hunter22"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Login successful!"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let flow = flow(&server);
    let res = flow.submit_login("  jane@example.com ", " hunter22 ").await;
    let outcome = completed(&flow, res);
    assert_eq!(outcome, Outcome::Success("Login successful!".to_string()));
    assert_eq!(visited(&flow), vec![Screen::Home]);
    assert_eq!(alerts(&flow)[0], Alert::new("Success", "Login successful!"));
}

#[tokio::test]
async fn test_login_validation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"msg": "Email invalid"}, {"msg": "Password too short"}]
        })))
        .mount(&server)
        .await;

    let flow = flow(&server);
    let res = flow.submit_login("jane", "x").await;
    let outcome = completed(&flow, res);
    assert_eq!(
        outcome.message().unwrap(),
        "Email invalid\nPassword too short"
    );
    assert!(matches!(outcome, Outcome::ValidationError(_)));
    assert!(visited(&flow).is_empty());
    assert_eq!(alerts(&flow)[0].title, "Validation Error");
}

#[tokio::test]
async fn test_login_generic_failure_with_non_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let flow = flow(&server);
    let res = flow.submit_login("jane", "hunter22").await;
    let outcome = completed(&flow, res);
    assert_eq!(
        outcome,
        Outcome::GenericFailure("Something went wrong.".to_string())
    );
    assert_eq!(
        alerts(&flow)[0],
        Alert::new("Login Failed", "Something went wrong.")
    );
}

#[tokio::test]
async fn test_login_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "too late"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let flow = flow_for(&server.uri(), Duration::from_millis(200));
    let res = flow.submit_login("jane", "hunter22").await;
    let outcome = completed(&flow, res);
    assert_eq!(outcome, Outcome::Timeout);
    assert!(visited(&flow).is_empty());
    assert_eq!(
        alerts(&flow)[0],
        Alert::new("Error", "Server timeout. Try again.")
    );
}

#[tokio::test]
async fn test_login_network_error() {
    // nothing listens on port 1
    let flow = flow_for("http://127.0.0.1:1", Duration::from_secs(5));
    let res = flow.submit_login("jane", "hunter22").await;
    let outcome = completed(&flow, res);
    assert_eq!(outcome, Outcome::NetworkError);
    assert_eq!(
        alerts(&flow)[0],
        Alert::new("Network Error", "Unable to reach server.")
    );
}

#[tokio::test]
async fn test_double_submit_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "ok"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let flow = flow(&server);
    let (first, second) = tokio::join!(
        flow.submit_login("jane", "hunter22"),
        flow.submit_login("jane", "hunter22"),
    );
    assert_eq!(first, Submission::Completed(Outcome::Success("ok".to_string())));
    assert_eq!(second, Submission::Rejected);
    assert!(!flow.loading().is_active());

    // once the first one finished, submitting works again
    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let again = flow.submit_login("jane", "hunter22").await;
    assert_eq!(
        again,
        Submission::Completed(Outcome::Success("Login successful!".to_string()))
    );
}

#[tokio::test]
async fn test_signup_invalid_username_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"status": "success"})))
        .expect(0)
        .mount(&server)
        .await;

    let flow = flow(&server);
    let mut form = valid_signup();
    form.username = "ab".to_string();
    match flow.submit_signup(&form).await {
        Submission::Invalid(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors.get(SignupField::Username).is_some());
        }
        other => panic!("expected local validation failure, got {:?}", other),
    }
    assert!(alerts(&flow).is_empty());
    assert!(!flow.loading().is_active());
}

#[tokio::test]
async fn test_signup_success_twice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .and(body_json(json!({
            "first_name": "Evelyn",
            "last_name": "Reed",
            "user_name": "drreed",
            "email_id": "evelyn@brightsmiles.example",
            "country_code": "+91",
            "phone_number": "9876543210",
            "location": "Pune",
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"status": "success", "message": "Account created"})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let flow = flow(&server);
    let form = valid_signup();
    let first = flow.submit_signup(&form).await;
    let second = flow.submit_signup(&form).await;
    let expected = Submission::Completed(Outcome::Success("Account created".to_string()));
    assert_eq!(first, expected);
    assert_eq!(second, expected);
    assert_eq!(visited(&flow), vec![Screen::Congrat, Screen::Congrat]);
    assert!(!flow.loading().is_active());
}

#[tokio::test]
async fn test_signup_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "User already exists"})),
        )
        .mount(&server)
        .await;

    let flow = flow(&server);
    let res = flow.submit_signup(&valid_signup()).await;
    let outcome = completed(&flow, res);
    assert_eq!(outcome, Outcome::Conflict("User already exists".to_string()));
    assert_eq!(
        alerts(&flow)[0],
        Alert::new("Signup Failed", "User already exists")
    );
    assert!(visited(&flow).is_empty());
}

#[tokio::test]
async fn test_signup_server_side_branches() {
    let cases = vec![
        (
            ResponseTemplate::new(400)
                .set_body_json(json!({"errors": ["Email taken", "Phone taken"]})),
            Outcome::ValidationError(vec!["Email taken".to_string(), "Phone taken".to_string()]),
            "Invalid Input",
        ),
        (
            ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})),
            Outcome::ServerError,
            "Server Error",
        ),
        (
            ResponseTemplate::new(403).set_body_json(json!({"message": "Signups closed"})),
            Outcome::GenericFailure("Signups closed".to_string()),
            "Signup Failed",
        ),
        (
            ResponseTemplate::new(201).set_body_json(json!({"status": "queued"})),
            Outcome::GenericFailure("Something went wrong.".to_string()),
            "Signup Failed",
        ),
    ];
    for (template, expected, title) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/signup"))
            .respond_with(template)
            .mount(&server)
            .await;

        let flow = flow(&server);
        let res = flow.submit_signup(&valid_signup()).await;
        let outcome = completed(&flow, res);
        assert_eq!(outcome, expected);
        assert_eq!(alerts(&flow)[0].title, title);
        assert!(visited(&flow).is_empty());
    }
}

#[tokio::test]
async fn test_signup_timeout_and_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"status": "success"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let flow = flow_for(&server.uri(), Duration::from_millis(200));
    let res = flow.submit_signup(&valid_signup()).await;
    assert_eq!(completed(&flow, res), Outcome::Timeout);

    let flow = flow_for("http://127.0.0.1:1", Duration::from_secs(5));
    let res = flow.submit_signup(&valid_signup()).await;
    assert_eq!(completed(&flow, res), Outcome::NetworkError);
    assert_eq!(alerts(&flow)[0].message, "Unable to reach the server.");
}

#[tokio::test]
async fn test_loading_cleared_before_alert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;

    let config = Config::default().with_api_host(&server.uri()).unwrap();
    let client = CredentialClient::from_config(&config).unwrap();
    let flow = AuthFlow::new(
        &config,
        client,
        RecordingNavigator::default(),
        LoadingAwareAlerter::default(),
    );
    *flow.alerter().loading.lock().unwrap() = Some(flow.loading());

    flow.submit_login("jane", "hunter22").await;
    // a failed exchange takes the same path
    server.reset().await;
    flow.submit_login("jane", "hunter22").await;

    assert_eq!(
        *flow.alerter().loading_when_shown.lock().unwrap(),
        vec![false, false]
    );
}
