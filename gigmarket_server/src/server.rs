use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use gigmarket_engine::{ChatApi, OrderFlowApi, ReviewApi, SqliteDatabase};
use razorpay_tools::RazorpayApi;

use crate::{
    auth::TokenIssuer,
    config::{ServerConfig, ServerOptions, WebhookSecret},
    errors::ServerError,
    razorpay_routes::RazorpayWebhookRoute,
    routes::{
        health,
        ConfirmOrderRoute,
        ConversationHistoryRoute,
        CreatePaymentIntentRoute,
        GigReviewsRoute,
        MyOrdersRoute,
        SubmitReviewRoute,
    },
    ws::{PresenceDirectory, WsEntryRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let webhook_secret = config.razorpay.webhook_secret.clone().ok_or_else(|| {
        ServerError::ConfigurationError(
            "GMK_RAZORPAY_WEBHOOK_SECRET is not set. Webhook deliveries cannot be verified without it, so the \
             server refuses to start."
                .to_string(),
        )
    })?;
    let webhook_secret = web::Data::new(WebhookSecret(webhook_secret));
    let razorpay_api =
        RazorpayApi::new(config.razorpay.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let razorpay_api = web::Data::new(razorpay_api);
    // Presence must be a single process-wide directory. A per-worker copy would make users who
    // joined on one worker invisible to pushes triggered on another.
    let presence: web::Data<PresenceDirectory> = web::Data::new(PresenceDirectory::new());
    let bind_addr = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let reviews_api = ReviewApi::new(db.clone());
        let chat_api = ChatApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let options = ServerOptions::from_config(&config);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("gms::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(reviews_api))
            .app_data(web::Data::new(chat_api))
            .app_data(web::Data::new(jwt_signer))
            .app_data(web::Data::new(options))
            .app_data(webhook_secret.clone())
            .app_data(razorpay_api.clone())
            .app_data(presence.clone());
        let api_scope = web::scope("/api")
            .service(CreatePaymentIntentRoute::<SqliteDatabase>::new())
            .service(ConfirmOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(SubmitReviewRoute::<SqliteDatabase>::new())
            .service(GigReviewsRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(ConversationHistoryRoute::<SqliteDatabase>::new());
        app.service(api_scope)
            .service(health)
            .service(RazorpayWebhookRoute::<SqliteDatabase>::new())
            .service(WsEntryRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind(bind_addr)?
    .run();
    Ok(srv)
}
