//! Billing backend for CPME licenses
//!
//! A stateless proxy in front of the payment processor:
//! - Checkout and customer portal sessions
//! - Subscription lookup, cancel and price change
//! - Signed webhook reception
//! - Health check

pub mod config;
mod error;
pub mod handlers;
pub mod provider;
pub mod stripe;
pub mod webhook;

pub use config::{Config, ConfigError};
pub use error::{BillingError, Result};
pub use provider::PaymentProvider;
pub use stripe::StripeClient;
pub use webhook::WebhookVerifier;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::web;

/// Register every route for provider `P`
///
/// Expects `web::Data<P>` and `web::Data<WebhookVerifier>` in app data.
pub fn configure_routes<P: PaymentProvider>(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/create-checkout-session",
        web::post().to(handlers::create_checkout_session::<P>),
    )
    .service(
        web::resource("/subscriptions/{id}")
            .route(web::get().to(handlers::get_subscription::<P>))
            .route(web::patch().to(handlers::update_subscription::<P>)),
    )
    .route(
        "/subscriptions/{id}/cancel",
        web::post().to(handlers::cancel_subscription::<P>),
    )
    .route(
        "/create-customer-portal-session",
        web::post().to(handlers::create_portal_session::<P>),
    )
    .route("/webhook", web::post().to(handlers::webhook))
    .route("/api/health", web::get().to(handlers::health));
}

/// CORS policy allowing the frontend origin only
pub fn configure_cors(frontend_url: &str) -> Cors {
    Cors::default()
        .allowed_origin(frontend_url)
        .allowed_methods(vec!["GET", "POST", "PATCH", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .supports_credentials()
        .max_age(3600)
}
