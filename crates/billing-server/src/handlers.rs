//! HTTP handlers

use crate::provider::{CheckoutRequest, PaymentProvider, PortalRequest, UpdateSubscriptionRequest};
use crate::webhook::{handle_event, WebhookVerifier, SIGNATURE_HEADER};
use crate::{BillingError, Result};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::info;
use serde_json::json;

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BillingError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}

pub async fn create_checkout_session<P: PaymentProvider>(
    provider: web::Data<P>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();
    require("priceId", &request.price_id)?;
    require("successUrl", &request.success_url)?;
    require("cancelUrl", &request.cancel_url)?;

    let session = provider.create_checkout_session(&request).await?;
    info!("checkout session {} created", session.id);
    Ok(HttpResponse::Ok().json(json!({ "id": session.id })))
}

pub async fn get_subscription<P: PaymentProvider>(
    provider: web::Data<P>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let subscription = provider.get_subscription(&path).await?;
    Ok(HttpResponse::Ok().json(subscription))
}

pub async fn cancel_subscription<P: PaymentProvider>(
    provider: web::Data<P>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let subscription = provider.cancel_subscription(&path).await?;
    info!("subscription {} canceled", path.as_str());
    Ok(HttpResponse::Ok().json(subscription))
}

pub async fn update_subscription<P: PaymentProvider>(
    provider: web::Data<P>,
    path: web::Path<String>,
    body: web::Json<UpdateSubscriptionRequest>,
) -> Result<HttpResponse> {
    require("priceId", &body.price_id)?;
    let subscription = provider.update_subscription(&path, &body.price_id).await?;
    Ok(HttpResponse::Ok().json(subscription))
}

pub async fn create_portal_session<P: PaymentProvider>(
    provider: web::Data<P>,
    body: web::Json<PortalRequest>,
) -> Result<HttpResponse> {
    require("customerId", &body.customer_id)?;
    require("returnUrl", &body.return_url)?;

    let session = provider.create_portal_session(&body).await?;
    Ok(HttpResponse::Ok().json(json!({ "url": session.url })))
}

pub async fn webhook(
    req: HttpRequest,
    payload: web::Bytes,
    verifier: web::Data<WebhookVerifier>,
) -> Result<HttpResponse> {
    let header = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| BillingError::InvalidSignature(format!("missing {SIGNATURE_HEADER} header")))?;

    let event = verifier.verify(&payload, header, Utc::now().timestamp())?;
    handle_event(&event);
    Ok(HttpResponse::Ok().json(json!({ "received": true })))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
