//! Stripe Checkout sessions
//!
//! Text input is a price id; the result is the hosted checkout `{id, url}`.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use super::{Fixture, ProviderAdapter, Submission, str_field, wrong_input};
use crate::defaults::stripe as defaults;
use crate::dispatch::HttpContext;
use crate::error::MediaError;
use crate::types::{InputRef, JobRequest, ProviderId};

#[derive(Debug, Clone, Default)]
pub struct StripeAdapter;

impl StripeAdapter {
    pub const fn new() -> Self {
        Self
    }

    fn price_id(request: &JobRequest) -> Result<&str, MediaError> {
        match &request.input {
            InputRef::Text(price) => Ok(price.trim()),
            other => Err(wrong_input(ProviderId::Stripe, other, "a price id")),
        }
    }

    /// Form fields for `POST /v1/checkout/sessions`.
    pub fn session_form(request: &JobRequest) -> Result<Vec<(&'static str, String)>, MediaError> {
        let mut form = vec![
            ("mode", "subscription".to_string()),
            ("line_items[0][price]", Self::price_id(request)?.to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            (
                "success_url",
                request
                    .option_str("success_url")
                    .unwrap_or(defaults::SUCCESS_URL)
                    .to_string(),
            ),
            (
                "cancel_url",
                request
                    .option_str("cancel_url")
                    .unwrap_or(defaults::CANCEL_URL)
                    .to_string(),
            ),
        ];
        if let Some(email) = request.option_str("customer_email") {
            form.push(("customer_email", email.to_string()));
        }
        if let Some(reference) = request.option_str("client_reference_id") {
            form.push(("client_reference_id", reference.to_string()));
        }
        Ok(form)
    }
}

#[async_trait]
impl ProviderAdapter for StripeAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Stripe
    }

    async fn submit(
        &self,
        http: &HttpContext,
        request: &JobRequest,
    ) -> Result<Submission, MediaError> {
        let form = Self::session_form(request)?;
        let (ctx, builder) = http.request(Method::POST, "/v1/checkout/sessions");
        let builder = builder.bearer_auth(http.api_key()).form(&form);
        let resp = http.send(&ctx, builder).await?;
        let session = resp.json()?;

        let (Some(id), Some(url)) = (str_field(&session, "id"), str_field(&session, "url")) else {
            return Err(MediaError::ProviderUnavailable(
                "checkout session response lacks id or url".into(),
            ));
        };
        Ok(Submission::Immediate {
            data: json!({ "id": id, "url": url }),
            http_status: resp.status,
            request_id: resp.request_id,
        })
    }

    fn fixture(&self, request: &JobRequest) -> Result<Fixture, MediaError> {
        let price = Self::price_id(request)?;
        let id = format!("cs_mock_{price}");
        let url = format!("https://checkout.stripe.com/c/pay/{id}");
        Ok(Fixture::Immediate(json!({ "id": id, "url": url })))
    }
}
