use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use payment_engine::{create_database_if_missing, PaymentFlowApi, SqliteDatabase};
use stripe_tools::{StripeApi, WebhookVerifier};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{health, CreatePaymentIntentRoute, StripeWebhookRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    create_database_if_missing(&config.database_url)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let stripe_api =
        StripeApi::new(config.stripe.stripe_api_config()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let verifier =
        WebhookVerifier::with_tolerance(config.stripe.webhook_secret.clone(), config.stripe.webhook_tolerance);
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let payments_api = PaymentFlowApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sps::access_log"))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(stripe_api.clone()))
            .app_data(web::Data::new(verifier.clone()))
            // Keep malformed-JSON rejections in the same error body as every other client error
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                ServerError::InvalidRequestBody(err.to_string()).into()
            }))
            .service(health)
            .service(CreatePaymentIntentRoute::<SqliteDatabase, StripeApi>::new())
            .service(StripeWebhookRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
