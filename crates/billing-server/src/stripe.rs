//! Stripe API client

use crate::provider::{
    CheckoutRequest, CheckoutSession, PaymentProvider, PortalRequest, PortalSession, Subscription,
};
use crate::{BillingError, Result};
use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

const STRIPE_API: &str = "https://api.stripe.com";

/// Stripe REST client with bearer auth and form-encoded bodies
pub struct StripeClient {
    client: Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: STRIPE_API.to_string(),
            secret_key: secret_key.into(),
        }
    }

    pub fn with_base_url(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.api_base, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, resource: &str) -> Result<T> {
        let response = request.bearer_auth(&self.secret_key).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(BillingError::NotFound(resource.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BillingError::Provider(error_message(status, &body)));
        }

        Ok(response.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Human-readable message from a Stripe error response
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| format!("status {status}"))
}

/// Form fields for a subscription checkout
fn checkout_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("mode", "subscription".to_string()),
        ("line_items[0][price]", request.price_id.clone()),
        ("line_items[0][quantity]", "1".to_string()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
    ];
    if let Some(customer) = &request.customer_id {
        form.push(("customer", customer.clone()));
    }
    form
}

/// Id of the first subscription item
fn first_item_id(subscription: &Subscription) -> Option<&str> {
    subscription
        .pointer("/items/data/0/id")
        .and_then(|v| v.as_str())
}

impl PaymentProvider for StripeClient {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        debug!("creating checkout session for price {}", request.price_id);
        let builder = self
            .client
            .post(self.url("checkout/sessions"))
            .form(&checkout_form(request));
        self.send(builder, "checkout session").await
    }

    async fn get_subscription(&self, id: &str) -> Result<Subscription> {
        let builder = self.client.get(self.url(&format!("subscriptions/{id}")));
        self.send(builder, id).await
    }

    async fn cancel_subscription(&self, id: &str) -> Result<Subscription> {
        debug!("canceling subscription {id}");
        let builder = self.client.delete(self.url(&format!("subscriptions/{id}")));
        self.send(builder, id).await
    }

    async fn update_subscription(&self, id: &str, price_id: &str) -> Result<Subscription> {
        let current = self.get_subscription(id).await?;
        let item = first_item_id(&current)
            .ok_or_else(|| BillingError::Provider(format!("subscription {id} has no items")))?
            .to_string();

        debug!("moving subscription {id} to price {price_id}");
        let form = [
            ("items[0][id]", item),
            ("items[0][price]", price_id.to_string()),
        ];
        let builder = self
            .client
            .post(self.url(&format!("subscriptions/{id}")))
            .form(&form);
        self.send(builder, id).await
    }

    async fn create_portal_session(&self, request: &PortalRequest) -> Result<PortalSession> {
        let form = [
            ("customer", request.customer_id.clone()),
            ("return_url", request.return_url.clone()),
        ];
        let builder = self
            .client
            .post(self.url("billing_portal/sessions"))
            .form(&form);
        self.send(builder, "billing portal session").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_url() {
        let client = StripeClient::new("sk_test").with_base_url("http://localhost:12111/");
        assert_eq!(
            client.url("subscriptions/sub_1"),
            "http://localhost:12111/v1/subscriptions/sub_1"
        );
    }

    #[test]
    fn test_checkout_form() {
        let request = CheckoutRequest {
            price_id: "price_pro".to_string(),
            customer_id: Some("cus_1".to_string()),
            success_url: "https://app/ok".to_string(),
            cancel_url: "https://app/ko".to_string(),
        };
        let form = checkout_form(&request);

        assert_eq!(form[0], ("mode", "subscription".to_string()));
        assert_eq!(form[1], ("line_items[0][price]", "price_pro".to_string()));
        assert_eq!(form.last(), Some(&("customer", "cus_1".to_string())));
    }

    #[test]
    fn test_first_item_id() {
        let subscription = json!({ "id": "sub_1", "items": { "data": [{ "id": "si_1" }] } });
        assert_eq!(first_item_id(&subscription), Some("si_1"));
        assert_eq!(first_item_id(&json!({ "id": "sub_2" })), None);
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error":{"message":"No such price: 'price_x'","type":"invalid_request_error"}}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            "No such price: 'price_x'"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>"),
            "status 502 Bad Gateway"
        );
    }
}
