use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use log::debug;
use serde::Serialize;
use stripe_tools::STRIPE_SIGNATURE_HEADER;

use crate::errors::ServerError;

/// POST a JSON body to a freshly configured test app and return the response status and body.
pub async fn post_json<B: Serialize>(
    path: &str,
    body: &B,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = TestRequest::post().uri(path).set_json(body).to_request();
    call(req, configure).await
}

/// POST raw bytes, optionally carrying a signature header, the way the processor delivers
/// webhook events.
pub async fn post_raw(
    path: &str,
    body: Vec<u8>,
    signature: Option<&str>,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::post().uri(path).set_payload(body);
    if let Some(signature) = signature {
        req = req.insert_header((STRIPE_SIGNATURE_HEADER, signature));
    }
    call(req.to_request(), configure).await
}

async fn call(req: actix_http::Request, configure: fn(&mut ServiceConfig)) -> Result<(StatusCode, String), String> {
    // Mirror the JSON error rewiring the real server does, so client errors share one body shape.
    let app = App::new()
        .app_data(
            web::JsonConfig::default()
                .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into()),
        )
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}
