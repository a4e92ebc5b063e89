use async_trait::async_trait;
use motopv_leads::api::contact::{ContactForm, SubmitError};
use motopv_leads::api::gateway::{GatewayError, MockSubmissionGateway, SubmissionGateway};
use motopv_leads::models::fields::ContactField;
use motopv_leads::models::requests::SubmissionPayload;
use motopv_leads::models::responses::{SubmissionReceipt, SubmissionResult};
use std::sync::Mutex;
use std::time::Duration;

/// Replays a fixed sequence of outcomes and records what it was sent.
struct ScriptedGateway {
    outcomes: Mutex<Vec<Result<SubmissionReceipt, GatewayError>>>,
    seen: Mutex<Vec<SubmissionPayload>>,
}

impl ScriptedGateway {
    fn new(mut outcomes: Vec<Result<SubmissionReceipt, GatewayError>>) -> Self {
        outcomes.reverse();
        Self {
            outcomes: Mutex::new(outcomes),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<SubmissionPayload> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionGateway for ScriptedGateway {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, GatewayError> {
        self.seen.lock().unwrap().push(payload.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Err(GatewayError::Failed))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn accepted() -> Result<SubmissionReceipt, GatewayError> {
    Ok(SubmissionReceipt {
        correlation_id: String::new(),
        message: None,
    })
}

fn fill(form: &mut ContactForm) {
    form.set_field(ContactField::Name, "Jo");
    form.set_field(ContactField::Email, "a@b.co");
    form.set_field(ContactField::Phone, "+1 555-123-4567");
    form.set_field(ContactField::Message, "Hello there!");
}

#[tokio::test]
async fn failure_then_retry_succeeds_with_the_same_values() {
    let gateway = ScriptedGateway::new(vec![Err(GatewayError::Failed), accepted()]);
    let mut form = ContactForm::new();
    fill(&mut form);

    let first = form.submit(&gateway).await.expect("valid");
    assert_eq!(
        first,
        SubmissionResult::fail("Failed to submit form. Please try again.")
    );
    assert_eq!(form.value(ContactField::Email), "a@b.co");

    let second = form.submit(&gateway).await.expect("valid");
    assert!(second.success);
    assert!(form.values().is_blank());

    let seen = gateway.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].fields, seen[1].fields);
    assert_ne!(seen[0].correlation_id, seen[1].correlation_id);
}

#[tokio::test]
async fn each_rule_reports_its_own_message() {
    let gateway = ScriptedGateway::new(vec![]);
    let mut form = ContactForm::new();
    form.set_field(ContactField::Name, " J ");
    form.set_field(ContactField::Email, "not-an-email");
    form.set_field(ContactField::Phone, "123-456");
    form.set_field(ContactField::Message, "   ");

    let Err(SubmitError::Invalid(errors)) = form.submit(&gateway).await else {
        panic!("expected validation errors");
    };
    assert_eq!(
        errors.message(ContactField::Name),
        Some("Name must be at least 2 characters")
    );
    assert_eq!(
        errors.message(ContactField::Email),
        Some("Please enter a valid email address")
    );
    assert_eq!(
        errors.message(ContactField::Phone),
        Some("Please enter a valid phone number")
    );
    assert_eq!(errors.message(ContactField::Message), Some("Message is required"));
    assert!(gateway.seen().is_empty());
}

#[tokio::test]
async fn server_rejection_text_reaches_the_user() {
    let gateway = ScriptedGateway::new(vec![Err(GatewayError::Rejected(
        "We only serve Malawi for now".to_string(),
    ))]);
    let mut form = ContactForm::new();
    fill(&mut form);

    let result = form.submit(&gateway).await.expect("valid");
    assert_eq!(result, SubmissionResult::fail("We only serve Malawi for now"));
    assert!(!form.values().is_blank());
}

#[tokio::test(start_paused = true)]
async fn default_mock_gateway_takes_two_seconds() {
    let gateway = MockSubmissionGateway::default().with_seed(1);
    let mut form = ContactForm::new();
    fill(&mut form);

    let started = tokio::time::Instant::now();
    form.submit(&gateway).await.expect("valid");
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert!(!form.is_submitting());
}
