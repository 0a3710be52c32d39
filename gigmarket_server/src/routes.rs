//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpResponse, Responder};
use gigmarket_engine::{
    db_types::{Rating, Role},
    traits::{MessageManagement, OrderManagement, ReviewManagement},
    ChatApi,
    CheckoutConfirmation,
    OrderFlowApi,
    ReviewApi,
};
use log::*;
use razorpay_tools::{NewPaymentIntent, RazorpayApi};

use crate::{
    auth::JwtClaims,
    data_objects::{ConfirmedOrder, GigReviews, PaymentIntentRequest, PaymentIntentResponse, ReviewSubmission},
    errors::ServerError,
};

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

//------------------------------------------   Payment intents  ------------------------------------------------

route!(create_payment_intent => Post "/payment/intent" impl OrderManagement);
/// Route handler for the payment intent endpoint
///
/// An authenticated client asks for a payment intent for a gig. The server resolves the gig, asks the gateway to
/// create the intent for the gig's listed price, and returns everything the frontend checkout widget needs. The
/// amount is quoted in minor units, exactly as it will later appear on the confirmation and the webhook.
///
/// Nothing is written to the database here. An intent the buyer abandons simply expires on the gateway's side.
pub async fn create_payment_intent<B: OrderManagement>(
    claims: JwtClaims,
    body: web::Json<PaymentIntentRequest>,
    orders: web::Data<OrderFlowApi<B>>,
    gateway: web::Data<RazorpayApi>,
) -> Result<HttpResponse, ServerError> {
    claims.require_role(Role::Client)?;
    let gig_id = body.gig_id;
    debug!("💻️ POST payment intent for gig {gig_id} from [{}]", claims.sub);
    let gig =
        orders.gig(gig_id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Gig {gig_id} does not exist")))?;
    let intent = NewPaymentIntent::inr(gig.price, &claims.sub, gig.id);
    let intent = gateway.create_payment_intent(intent).await?;
    let result = PaymentIntentResponse {
        intent_id: intent.id,
        amount: intent.amount,
        currency: intent.currency,
        key_id: gateway.key_id().to_string(),
    };
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Orders  ----------------------------------------------------

route!(confirm_order => Post "/orders/confirm" impl OrderManagement);
/// Route handler for the client-side checkout confirmation endpoint
///
/// The frontend calls this when the gateway's checkout widget resolves successfully. The buyer is taken from the
/// access token, never from the request body. The call is idempotent: replays, and races against the webhook path,
/// return the already-recorded order with `created: false`.
pub async fn confirm_order<B: OrderManagement>(
    claims: JwtClaims,
    body: web::Json<CheckoutConfirmation>,
    orders: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    claims.require_role(Role::Client)?;
    let confirmation = body.into_inner();
    if confirmation.payment_id.as_str().is_empty() ||
        confirmation.gateway_order_id.is_empty() ||
        confirmation.signature.is_empty()
    {
        return Err(ServerError::InvalidRequestBody(
            "paymentId, orderId and signature are all required".to_string(),
        ));
    }
    debug!("💻️ POST order confirmation for payment id {} from [{}]", confirmation.payment_id, claims.sub);
    let (order, created) = orders.checkout_confirmed(&claims.sub, confirmation).await?;
    Ok(HttpResponse::Ok().json(ConfirmedOrder { order, created }))
}

route!(my_orders => Get "/orders" impl OrderManagement);
/// Route handler for the orders endpoint
///
/// Authenticated users fetch their own orders here. The user id comes from the JWT supplied in the
/// `gmk_access_token` header; clients see the orders they bought, freelancers the orders on their gigs. There is no
/// way to request another user's orders.
pub async fn my_orders<B: OrderManagement>(
    claims: JwtClaims,
    orders: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for [{}] ({})", claims.sub, claims.role);
    let orders = orders.orders_for_user(&claims.sub, claims.role).await?;
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Reviews  ----------------------------------------------------

route!(submit_review => Post "/reviews" impl ReviewManagement);
/// Route handler for the review submission endpoint
///
/// Only clients with a paid, not-yet-reviewed order for the gig may leave a review, and only one per gig. The
/// entitlement and dedup checks live in the engine; this handler only validates the rating range and maps errors to
/// status codes.
pub async fn submit_review<B: ReviewManagement>(
    claims: JwtClaims,
    body: web::Json<ReviewSubmission>,
    reviews: web::Data<ReviewApi<B>>,
) -> Result<HttpResponse, ServerError> {
    claims.require_role(Role::Client)?;
    let submission = body.into_inner();
    debug!("💻️ POST review for gig {} from [{}]", submission.gig_id, claims.sub);
    let rating = Rating::new(submission.rating).map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
    let review = reviews.submit_review(&claims.sub, submission.gig_id, rating, submission.comment).await?;
    Ok(HttpResponse::Ok().json(review))
}

route!(gig_reviews => Get "/reviews/{gig_id}" impl OrderManagement, ReviewManagement);
/// Route handler for the review listing endpoint
///
/// Anyone may browse a gig's reviews; no token required. Reviews are returned newest first, together with the
/// aggregate the gig row maintains.
pub async fn gig_reviews<BOrd, BRev>(
    path: web::Path<i64>,
    orders: web::Data<OrderFlowApi<BOrd>>,
    reviews: web::Data<ReviewApi<BRev>>,
) -> Result<HttpResponse, ServerError>
where
    BOrd: OrderManagement,
    BRev: ReviewManagement,
{
    let gig_id = path.into_inner();
    debug!("💻️ GET reviews for gig {gig_id}");
    let gig =
        orders.gig(gig_id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Gig {gig_id} does not exist")))?;
    let reviews = reviews.reviews_for_gig(gig_id).await?;
    let result = GigReviews {
        gig_id,
        average_rating: gig.average_rating(),
        review_count: reviews.len() as i64,
        reviews,
    };
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Chat  ----------------------------------------------------

route!(conversation_history => Get "/chat/{conversation_id}" impl MessageManagement);
/// Route handler for the chat history endpoint
///
/// The conversation id encodes its two participants (`alice:bob`, ordered). Only those two may read the history;
/// everyone else gets a 403 regardless of whether the conversation exists. Messages come back oldest first, the
/// order a chat window renders them in.
pub async fn conversation_history<B: MessageManagement>(
    claims: JwtClaims,
    path: web::Path<String>,
    chat: web::Data<ChatApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let conversation_id = path.into_inner();
    if !conversation_id.split(':').any(|participant| participant == claims.sub) {
        debug!("💻️ [{}] asked for conversation {conversation_id} but is not a participant", claims.sub);
        return Err(ServerError::InsufficientPermissions(
            "Only participants may read a conversation's history".to_string(),
        ));
    }
    debug!("💻️ GET chat history for {conversation_id}");
    let messages = chat.history(&conversation_id).await?;
    Ok(HttpResponse::Ok().json(messages))
}
