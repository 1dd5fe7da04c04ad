//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current
//! thread will cause the current worker to stop processing new requests. For this reason, any
//! long, non-cpu-bound operation (e.g. I/O, database operations, the processor call) must be
//! expressed as futures or asynchronous functions, which get executed concurrently by worker
//! threads and thus don't block execution.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use futures::StreamExt;
use log::*;
use payment_engine::{
    db_types::{NewPayment, PaymentStatus},
    PaymentFlowApi,
    PaymentStore,
};
use stripe_tools::{PaymentProvider, WebhookVerifier, STRIPE_SIGNATURE_HEADER};

use crate::{
    data_objects::{PaymentIntentRequest, PaymentIntentResponse, WebhookAck},
    errors::ServerError,
};

/// The webhook payload ceiling. Larger deliveries are rejected before any signature
/// verification or parsing is attempted.
pub const MAX_WEBHOOK_PAYLOAD_SIZE: usize = 65_536;

/// The only event type that mutates local state. Everything else is acknowledged and dropped.
const PAYMENT_SUCCEEDED_EVENT: &str = "payment_intent.succeeded";

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Initiation  ----------------------------------------------------
route!(create_payment_intent => Post "/create-payment-intent" impl PaymentStore, PaymentProvider);
/// Route handler for the payment initiation endpoint.
///
/// Asks the processor to create a payment intent for the requested amount and currency, records
/// the resulting payment locally with the processor-assigned id, and returns the client secret
/// the payer's client needs to complete authorization.
///
/// The intent is created with the processor *before* the local insert. If the insert then fails,
/// a processor-side intent exists with no local record; that gap is logged and surfaced as a
/// server error, and a later settlement webhook for it will come back 404.
pub async fn create_payment_intent<BPay, PIntent>(
    body: web::Json<PaymentIntentRequest>,
    api: web::Data<PaymentFlowApi<BPay>>,
    provider: web::Data<PIntent>,
) -> Result<HttpResponse, ServerError>
where
    BPay: PaymentStore,
    PIntent: PaymentProvider,
{
    let request = body.into_inner();
    let (amount, currency) = request.validate()?;
    trace!("💳️ Received create-payment-intent request for {amount} {currency}");
    let intent = provider.create_payment_intent(amount, &currency).await.map_err(|e| {
        warn!("💳️ The processor rejected the intent-creation call. {e}");
        ServerError::from(e)
    })?;
    let status = PaymentStatus::from_processor_status(&intent.status);
    let payment = NewPayment::new(amount, currency, intent.id.clone(), status);
    if let Err(e) = api.process_new_payment(payment).await {
        error!("💳️ Could not record payment for intent {}. The intent exists at the processor without a local record. {e}", intent.id);
        return Err(e.into());
    }
    info!("💳️ Payment intent {} recorded with status {status}", intent.id);
    Ok(HttpResponse::Ok().json(PaymentIntentResponse { client_secret: intent.client_secret }))
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(stripe_webhook => Post "/webhook" impl PaymentStore);
/// Route handler for processor webhook notifications.
///
/// The order of checks is part of the contract: payload size first, then signature verification
/// over the raw bytes, then event parsing, and only then a store lookup. A delivery that fails
/// any step must leave the store untouched.
///
/// Only `payment_intent.succeeded` events mutate state. Every other event type, including types
/// this server has never seen, is acknowledged with a 200 so the processor does not retry it.
/// Settlement events are delivered at least once; reconciling the same intent again re-applies
/// the same status and acknowledges normally.
pub async fn stripe_webhook<BPay>(
    req: HttpRequest,
    payload: web::Payload,
    api: web::Data<PaymentFlowApi<BPay>>,
    verifier: web::Data<WebhookVerifier>,
) -> Result<HttpResponse, ServerError>
where
    BPay: PaymentStore,
{
    trace!("🔔️ Received webhook request: {}", req.uri());
    let body = read_payload(payload, MAX_WEBHOOK_PAYLOAD_SIZE).await?;
    let signature = req
        .headers()
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServerError::AuthenticityError("No signature header found.".to_string()))?;
    let event = verifier.verify_and_parse(&body, signature).map_err(|e| {
        warn!("🔐️ Webhook delivery failed verification. {e}");
        ServerError::from(e)
    })?;
    if event.event_type != PAYMENT_SUCCEEDED_EVENT {
        debug!("🔔️ Acknowledging {} event {} without side effects", event.event_type, event.id);
        return Ok(HttpResponse::Ok().json(WebhookAck::success()));
    }
    let intent = event.payment_intent().map_err(|e| {
        ServerError::Unspecified(format!("Could not deserialize the payment intent in event {}. {e}", event.id))
    })?;
    let payment = api.confirm_payment(&intent.id).await.map_err(|e| {
        warn!("🔔️ Could not reconcile payment intent {}. {e}", intent.id);
        ServerError::from(e)
    })?;
    info!("🔔️ Payment [{}] reconciled with status {}", payment.processor_payment_id, payment.status);
    Ok(HttpResponse::Ok().json(WebhookAck::success()))
}

/// Read the raw request body, failing fast once it exceeds `limit`. The bytes are needed exactly
/// as delivered for signature verification, so no framework deserialization may touch them first.
async fn read_payload(mut payload: web::Payload, limit: usize) -> Result<web::BytesMut, ServerError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| ServerError::PayloadReadError(e.to_string()))?;
        if body.len() + chunk.len() > limit {
            return Err(ServerError::PayloadTooLarge(limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
