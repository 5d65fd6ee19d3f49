//! Payment provider port

use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

/// Subscription object as returned by the provider, passed through as is
pub type Subscription = Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub price_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalRequest {
    pub customer_id: String,
    pub return_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalSession {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    pub price_id: String,
}

/// Operations the billing API forwards to the payment processor.
///
/// Implementations hold no request state; every call maps to one or two
/// provider API requests and nothing is retried.
pub trait PaymentProvider: Send + Sync + 'static {
    /// Start a hosted checkout for a subscription price.
    fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> impl Future<Output = Result<CheckoutSession>> + Send;

    fn get_subscription(&self, id: &str) -> impl Future<Output = Result<Subscription>> + Send;

    /// Cancel immediately and return the canceled subscription.
    fn cancel_subscription(&self, id: &str) -> impl Future<Output = Result<Subscription>> + Send;

    /// Move the subscription's first item to another price.
    fn update_subscription(
        &self,
        id: &str,
        price_id: &str,
    ) -> impl Future<Output = Result<Subscription>> + Send;

    /// Open the self-service billing portal for a customer.
    fn create_portal_session(
        &self,
        request: &PortalRequest,
    ) -> impl Future<Output = Result<PortalSession>> + Send;
}
