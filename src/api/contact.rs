// Contact form controller
//
// validate -> guard against double submission -> gateway -> reset on success.

use crate::api::gateway::SubmissionGateway;
use crate::models::fields::{ContactField, FieldValues};
use crate::models::requests::{FormKind, SubmissionPayload};
use crate::models::responses::SubmissionResult;
use crate::models::state::SubmitPhase;
use crate::utils::logging::redact_fields;
use crate::utils::validation::{validate_contact, ValidationErrors};

use log::{debug, info, warn};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("a submission is already in progress")]
    AlreadySubmitting,
    #[error("form has {} invalid field(s)", .0.len())]
    Invalid(ValidationErrors),
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    values: FieldValues<ContactField>,
    errors: ValidationErrors,
    phase: SubmitPhase,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_field(&mut self, field: ContactField, value: impl Into<String>) {
        self.values.set(field, value);
    }

    pub fn value(&self, field: ContactField) -> &str {
        self.values.get(field)
    }

    pub fn values(&self) -> &FieldValues<ContactField> {
        &self.values
    }

    /// Errors from the last validation pass.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn clear_errors(&mut self) {
        self.errors = ValidationErrors::default();
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }

    /// Run every rule and keep the result for display.
    pub fn validate(&mut self) -> bool {
        self.errors = validate_contact(&self.values);
        self.errors.is_valid()
    }

    /// Validate and enter the in-flight phase. The returned payload is what the
    /// gateway should receive; call [`ContactForm::finish_submit`] with its outcome.
    pub fn begin_submit(&mut self) -> Result<SubmissionPayload, SubmitError> {
        if self.is_submitting() {
            warn!("[PHASE: submission] [STEP: contact] Submit ignored: already in progress");
            return Err(SubmitError::AlreadySubmitting);
        }

        if !self.validate() {
            debug!(
                "[PHASE: validation] [STEP: contact] {} field(s) failed validation",
                self.errors.len()
            );
            return Err(SubmitError::Invalid(self.errors.clone()));
        }

        let payload = SubmissionPayload::from_fields(FormKind::Contact, &self.values);
        info!(
            "[PHASE: submission] [STEP: contact] Submitting contact form (correlation_id={}) {:?}",
            payload.correlation_id,
            redact_fields(&payload.fields)
        );
        self.phase = SubmitPhase::Submitting;
        Ok(payload)
    }

    /// Leave the in-flight phase. Values are cleared only when the backend accepted them.
    pub fn finish_submit(&mut self, result: &SubmissionResult) {
        self.phase = SubmitPhase::Idle;
        if result.success {
            self.values.reset();
            self.clear_errors();
        }
    }

    pub async fn submit(
        &mut self,
        gateway: &dyn SubmissionGateway,
    ) -> Result<SubmissionResult, SubmitError> {
        let payload = self.begin_submit()?;
        let result = SubmissionResult::from(gateway.submit(&payload).await);
        self.finish_submit(&result);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::gateway::GatewayError;
    use crate::models::responses::{SubmissionReceipt, FAILURE_MESSAGE, SUCCESS_MESSAGE};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        accept: bool,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(accept: bool) -> Self {
            Self {
                accept,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SubmissionGateway for Scripted {
        async fn submit(
            &self,
            payload: &SubmissionPayload,
        ) -> Result<SubmissionReceipt, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.accept {
                Ok(SubmissionReceipt {
                    correlation_id: payload.correlation_id.clone(),
                    message: None,
                })
            } else {
                Err(GatewayError::Failed)
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn filled() -> ContactForm {
        let mut form = ContactForm::new();
        form.set_field(ContactField::Name, "Jo");
        form.set_field(ContactField::Email, "a@b.co");
        form.set_field(ContactField::Phone, "+1 555-123-4567");
        form.set_field(ContactField::Message, "Hello there!");
        form
    }

    #[tokio::test]
    async fn accepted_submission_clears_the_form() {
        let gateway = Scripted::new(true);
        let mut form = filled();

        let result = form.submit(&gateway).await.expect("valid form");
        assert_eq!(result, SubmissionResult::ok(SUCCESS_MESSAGE));
        assert!(form.values().is_blank());
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn failed_submission_keeps_values() {
        let gateway = Scripted::new(false);
        let mut form = filled();
        let before = form.values().clone();

        let result = form.submit(&gateway).await.expect("valid form");
        assert_eq!(result, SubmissionResult::fail(FAILURE_MESSAGE));
        assert_eq!(form.values(), &before);
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_gateway() {
        let gateway = Scripted::new(true);
        let mut form = filled();
        form.set_field(ContactField::Message, "short");

        match form.submit(&gateway).await {
            Err(SubmitError::Invalid(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(
                    errors.message(ContactField::Message),
                    Some("Message must be at least 10 characters")
                );
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
        assert_eq!(form.value(ContactField::Message), "short");
    }

    #[test]
    fn second_submit_while_in_flight_is_refused() {
        let mut form = filled();
        form.begin_submit().expect("first submit");
        assert!(form.is_submitting());
        assert_eq!(form.begin_submit(), Err(SubmitError::AlreadySubmitting));

        form.finish_submit(&SubmissionResult::fail(FAILURE_MESSAGE));
        assert!(form.begin_submit().is_ok());
    }

    #[test]
    fn clear_errors_empties_the_last_pass() {
        let mut form = ContactForm::new();
        assert!(!form.validate());
        assert_eq!(form.errors().len(), 4);

        form.clear_errors();
        assert!(form.errors().is_empty());
    }
}
