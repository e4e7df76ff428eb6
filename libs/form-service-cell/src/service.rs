use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use shared_models::BookingUser;
use tracing::{info, warn};

use browser_pool_cell::Page;

use crate::error::FormError;
use crate::fields::{required_fields, FORM_SELECTORS};
use crate::outcome::SubmitOutcome;

const BOT_DETECTION_PHRASES: &[&str] =
    &["uso irregular", "se detectó un uso irregular del sitio", "comunícate con el negocio"];

const THANK_YOU_WORDS: &[&str] = &["gracias", "reserva"];

/// Fills, submits, and classifies the result of the venue's booking form,
/// grounded in a scripted-fill-first, native-interaction-fallback strategy
/// per field (spec.md §4.B).
#[derive(Default)]
pub struct FormService;

impl FormService {
    pub fn new() -> Self {
        Self
    }

    /// Maps a [`BookingUser`] onto the venue's form field keys.
    pub fn map_user(&self, user: &BookingUser) -> HashMap<&'static str, String> {
        let mut data = HashMap::new();
        data.insert("firstName", user.first_name.clone());
        data.insert("lastName", user.last_name.clone());
        data.insert("phone", user.phone.clone());
        data.insert("email", user.email.clone());
        data
    }

    /// Returns the required field keys missing (empty or absent) from `data`.
    pub fn validate(&self, data: &HashMap<&'static str, String>) -> Vec<&'static str> {
        required_fields()
            .into_iter()
            .filter(|field| data.get(field).map(|v| v.trim().is_empty()).unwrap_or(true))
            .collect()
    }

    /// Fills every field in `data`, preferring the scripted `set_value`
    /// write and falling back to `type_into` only when the element reports
    /// itself non-actionable for the primary strategy. Returns the keys
    /// successfully filled.
    pub async fn fill(
        &self,
        page: &Arc<dyn Page>,
        data: &HashMap<&'static str, String>,
    ) -> Result<Vec<&'static str>, FormError> {
        let mut filled = Vec::with_capacity(FORM_SELECTORS.len());

        for (field, selector) in FORM_SELECTORS {
            let Some(value) = data.get(field) else { continue };
            if value.is_empty() {
                continue;
            }

            if page.set_value(selector, value).await? {
                filled.push(*field);
                continue;
            }

            warn!(field, "scripted fill rejected, falling back to native interaction");
            if page.type_into(selector, value).await? {
                filled.push(*field);
            } else {
                warn!(field, "field not found by either fill strategy");
            }
        }

        if filled.is_empty() {
            return Err(FormError::NothingFilled);
        }

        info!(filled = filled.len(), "filled form fields");
        Ok(filled)
    }

    /// Detects inline validation errors left on the page after filling,
    /// mirroring the venue's red "obligatorio" (required) field markers and
    /// empty `client.*` inputs. Reads each input's `.value` property rather
    /// than its visible text — an `<input>`'s text is always empty
    /// regardless of its value, so `find_all_text` would flag every field.
    pub async fn check_validation(&self, page: &Arc<dyn Page>) -> Result<Vec<String>, FormError> {
        let mut errors = Vec::new();
        for (field, selector) in FORM_SELECTORS {
            if !page.exists(selector).await? {
                continue;
            }
            if page.value_of(selector).await?.trim().is_empty() {
                errors.push(format!("{field} is empty"));
            }
        }

        let required_texts = page.find_all_text("[class*=\"error\"]").await?;
        errors.extend(required_texts.into_iter().filter(|t| !t.trim().is_empty()));

        Ok(errors)
    }

    /// Submits the form, preferring the "Confirmar" labelled button and
    /// falling back to the generic submit button.
    pub async fn submit(&self, page: &Arc<dyn Page>) -> Result<(), FormError> {
        if page.click_matching_text("button", "Confirmar").await? {
            return Ok(());
        }
        if page.click("button[type=\"submit\"]").await? {
            return Ok(());
        }
        Err(FormError::SubmitFailed)
    }

    /// Classifies the post-submit page in priority order: bot detection,
    /// then validation errors, then the confirmation URL and thank-you
    /// phrase success signatures, then unknown.
    pub async fn check_success(&self, page: &Arc<dyn Page>) -> Result<SubmitOutcome, FormError> {
        let url = page.current_url().await?;
        let text = page.body_text().await?;
        let text_lower = text.to_lowercase();

        if BOT_DETECTION_PHRASES.iter().any(|phrase| text_lower.contains(phrase)) {
            return Ok(SubmitOutcome::BotDetected {
                message: "bot detection triggered on venue site".to_string(),
            });
        }

        let error_texts = page.find_all_text(".error, .field-error, [class*=\"error\"]").await?;
        let errors: Vec<String> = error_texts.into_iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect();
        if !errors.is_empty() {
            return Ok(SubmitOutcome::ValidationError { messages: errors });
        }

        let confirmation_re = Regex::new(r"/confirmation/([a-zA-Z0-9]+)").expect("valid regex");
        if let Some(captures) = confirmation_re.captures(&url) {
            let confirmation_id = captures.get(1).map(|m| m.as_str().to_string());
            return Ok(SubmitOutcome::Success {
                confirmation_id,
                message: "reservation confirmed".to_string(),
            });
        }

        if THANK_YOU_WORDS.iter().all(|word| text_lower.contains(word)) {
            return Ok(SubmitOutcome::Success { confirmation_id: None, message: "reservation completed".to_string() });
        }

        Ok(SubmitOutcome::Unknown { message: "no confirmation detected".to_string() })
    }

    /// Composes validation, fill, post-fill validation, submit, and
    /// classification into a single attempt.
    pub async fn fill_and_submit(
        &self,
        page: &Arc<dyn Page>,
        user: &BookingUser,
    ) -> Result<SubmitOutcome, FormError> {
        let data = self.map_user(user);

        let missing = self.validate(&data);
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing.into_iter().map(String::from).collect()));
        }

        self.fill(page, &data).await?;

        let errors = self.check_validation(page).await?;
        if !errors.is_empty() {
            return Err(FormError::ValidationFailed(errors.join("; ")));
        }

        self.submit(page).await?;

        let outcome = self.check_success(page).await?;
        if let SubmitOutcome::BotDetected { .. } = &outcome {
            return Err(FormError::BotDetected);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use browser_pool_cell::FakePage;
    use shared_models::BookingUser;

    fn user() -> BookingUser {
        BookingUser {
            user_id: "u1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "+50212345678".into(),
            tier: None,
        }
    }

    async fn page_with_fields() -> (Arc<dyn Page>, FakePage) {
        let fake = FakePage::new();
        for (_, selector) in FORM_SELECTORS {
            fake.set_elements(*selector, vec![String::new()]).await;
        }
        let page: Arc<dyn Page> = Arc::new(fake.clone());
        (page, fake)
    }

    #[tokio::test]
    async fn validate_reports_missing_required_fields() {
        let service = FormService::new();
        let mut data = HashMap::new();
        data.insert("firstName", "Ada".to_string());
        let missing = service.validate(&data);
        assert!(missing.contains(&"lastName"));
        assert!(missing.contains(&"email"));
        assert!(missing.contains(&"phone"));
    }

    #[tokio::test]
    async fn fill_prefers_set_value_over_type_into() {
        let service = FormService::new();
        let (page, fake) = page_with_fields().await;
        let data = service.map_user(&user());

        let filled = service.fill(&page, &data).await.unwrap();
        assert_eq!(filled.len(), FORM_SELECTORS.len());

        let state = fake.state.lock().await;
        assert_eq!(state.set_values.len(), FORM_SELECTORS.len());
        assert!(state.typed_values.is_empty());
    }

    #[tokio::test]
    async fn fill_falls_back_to_type_into_when_set_value_rejected() {
        let service = FormService::new();
        let (page, fake) = page_with_fields().await;
        fake.reject_set_value("input[name=\"client.firstName\"]").await;
        let data = service.map_user(&user());

        let filled = service.fill(&page, &data).await.unwrap();
        assert_eq!(filled.len(), FORM_SELECTORS.len());

        let state = fake.state.lock().await;
        assert_eq!(state.typed_values.len(), 1);
        assert_eq!(state.typed_values[0].0, "input[name=\"client.firstName\"]");
    }

    #[tokio::test]
    async fn fill_errors_when_no_fields_exist() {
        let service = FormService::new();
        let fake = FakePage::new();
        let page: Arc<dyn Page> = Arc::new(fake);
        let data = service.map_user(&user());

        let err = service.fill(&page, &data).await.unwrap_err();
        assert!(matches!(err, FormError::NothingFilled));
    }

    #[tokio::test]
    async fn check_success_detects_bot_detection_first() {
        let service = FormService::new();
        let fake = FakePage::new();
        fake.set_body_text("Se detectó un uso irregular del sitio, Comunícate con el negocio").await;
        fake.set_elements(".error, .field-error, [class*=\"error\"]", vec!["algo salió mal".into()]).await;
        let page: Arc<dyn Page> = Arc::new(fake);

        let outcome = service.check_success(&page).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::BotDetected { .. }));
    }

    #[tokio::test]
    async fn check_success_detects_confirmation_url() {
        let service = FormService::new();
        let fake = FakePage::new();
        fake.set_current_url("https://venue.example.com/confirmation/ABC123").await;
        fake.set_body_text("Reserva confirmada").await;
        let page: Arc<dyn Page> = Arc::new(fake);

        let outcome = service.check_success(&page).await.unwrap();
        match outcome {
            SubmitOutcome::Success { confirmation_id, .. } => {
                assert_eq!(confirmation_id.as_deref(), Some("ABC123"));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn check_success_detects_thank_you_fallback() {
        let service = FormService::new();
        let fake = FakePage::new();
        fake.set_current_url("https://venue.example.com/booked").await;
        fake.set_body_text("Gracias por tu reserva").await;
        let page: Arc<dyn Page> = Arc::new(fake);

        let outcome = service.check_success(&page).await.unwrap();
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn check_success_falls_back_to_unknown() {
        let service = FormService::new();
        let fake = FakePage::new();
        fake.set_current_url("https://venue.example.com/").await;
        fake.set_body_text("nothing notable here").await;
        let page: Arc<dyn Page> = Arc::new(fake);

        let outcome = service.check_success(&page).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Unknown { .. }));
    }

    #[tokio::test]
    async fn check_validation_passes_once_fields_are_filled() {
        let service = FormService::new();
        let (page, _fake) = page_with_fields().await;
        let data = service.map_user(&user());

        service.fill(&page, &data).await.unwrap();
        let errors = service.check_validation(&page).await.unwrap();
        assert!(errors.is_empty(), "filled required fields must not be reported as empty: {errors:?}");
    }

    #[tokio::test]
    async fn check_validation_flags_a_field_whose_value_is_still_blank() {
        let service = FormService::new();
        let (page, _fake) = page_with_fields().await;
        let mut data = service.map_user(&user());
        data.insert("email", String::new());

        service.fill(&page, &data).await.unwrap();
        let errors = service.check_validation(&page).await.unwrap();
        assert!(errors.iter().any(|e| e.contains("email")));
    }

    #[tokio::test]
    async fn fill_and_submit_reaches_success_when_fields_are_complete() {
        let service = FormService::new();
        let (page, fake) = page_with_fields().await;
        fake.set_current_url("https://venue.example.com/confirmation/ABC123").await;
        fake.set_body_text("Reserva confirmada").await;

        let outcome = service.fill_and_submit(&page, &user()).await.unwrap();
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn fill_and_submit_rejects_missing_fields_up_front() {
        let service = FormService::new();
        let fake = FakePage::new();
        let page: Arc<dyn Page> = Arc::new(fake);
        let mut incomplete = user();
        incomplete.email = String::new();

        let err = service.fill_and_submit(&page, &incomplete).await.unwrap_err();
        assert!(matches!(err, FormError::MissingFields(_)));
    }
}
