use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use billing_server::{configure_cors, configure_routes, Config, StripeClient, WebhookVerifier};
use dotenv::dotenv;
use log::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let provider = web::Data::new(
        StripeClient::new(config.stripe_secret_key.clone()).with_base_url(config.stripe_api_base.clone()),
    );
    let verifier = web::Data::new(WebhookVerifier::new(config.stripe_webhook_secret.clone()));
    let frontend_url = config.frontend_url.clone();

    info!("Billing server listening on port {}", config.port);
    info!("Allowing requests from {frontend_url}");

    HttpServer::new(move || {
        App::new()
            .wrap(configure_cors(&frontend_url))
            .wrap(Logger::default())
            .app_data(provider.clone())
            .app_data(verifier.clone())
            .configure(configure_routes::<StripeClient>)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await?;

    Ok(())
}
