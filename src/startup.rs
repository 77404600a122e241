use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::http::Method;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::routes::{
    booking_url, booking_url_method_not_allowed, contact_method_not_allowed, health_check,
    save_chat_request, save_chat_request_method_not_allowed, submit_contact,
};
use crate::submission_sink::SubmissionSink;
use crate::utils::{preflight, GET_AND_OPTIONS, POST_AND_OPTIONS};

pub struct ContactSink(pub SubmissionSink);

pub struct LeadSink(pub SubmissionSink);

/// Resolved once at startup, `None` when the deployment has no booking link.
pub struct BookingUrl(pub Option<String>);

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind to {}", address))?;
        let port = listener.local_addr()?.port();

        let store = Arc::new(configuration.fallback_store.store());
        let contact_sink = match configuration
            .delivery
            .client()
            .context("Failed to build the webhook client")?
        {
            Some(client) => SubmissionSink::Webhook(client),
            None if configuration.delivery.store_when_unconfigured => {
                SubmissionSink::Store(store.clone())
            }
            None => SubmissionSink::Discard,
        };
        let lead_sink = SubmissionSink::Store(store);

        let server = run(
            listener,
            ContactSink(contact_sink),
            LeadSink(lead_sink),
            BookingUrl(configuration.booking.booking_url()),
            configuration.application.max_body_bytes,
        )?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    contact_sink: ContactSink,
    lead_sink: LeadSink,
    booking_url_config: BookingUrl,
    max_body_bytes: usize,
) -> Result<Server, anyhow::Error> {
    let contact_sink = web::Data::new(contact_sink);
    let lead_sink = web::Data::new(lead_sink);
    let booking_url_config = web::Data::new(booking_url_config);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/api/contact")
                    .route(web::post().to(submit_contact))
                    .route(
                        web::method(Method::OPTIONS).to(|| async { preflight(POST_AND_OPTIONS) }),
                    )
                    .default_service(web::to(contact_method_not_allowed)),
            )
            .service(
                web::resource("/api/save-chat-request")
                    .route(web::post().to(save_chat_request))
                    .route(
                        web::method(Method::OPTIONS).to(|| async { preflight(POST_AND_OPTIONS) }),
                    )
                    .default_service(web::to(save_chat_request_method_not_allowed)),
            )
            .service(
                web::resource("/api/booking-url")
                    .route(web::get().to(booking_url))
                    .route(
                        web::method(Method::OPTIONS).to(|| async { preflight(GET_AND_OPTIONS) }),
                    )
                    .default_service(web::to(booking_url_method_not_allowed)),
            )
            .app_data(web::PayloadConfig::new(max_body_bytes))
            .app_data(contact_sink.clone())
            .app_data(lead_sink.clone())
            .app_data(booking_url_config.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}
