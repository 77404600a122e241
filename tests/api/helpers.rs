use std::path::PathBuf;

use once_cell::sync::Lazy;
use reqwest::Method;
use secrecy::Secret;
use site_intake::configuration::{get_configuration, Settings};
use site_intake::domain::SubmissionPayload;
use site_intake::fallback_store::FallbackStore;
use site_intake::startup::Application;
use site_intake::telemetry::{get_subscriber, init_subscriber};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockBuilder, MockServer};

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber).expect("Failed to install the test subscriber");
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber).expect("Failed to install the test subscriber");
    };
});

pub const WEBHOOK_PATH: &str = "/hooks/contact";
pub const BOOKING_URL: &str = "https://cal.example/x";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub webhook_server: MockServer,
    pub store_path: PathBuf,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_contact(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/contact", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_contact_raw(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/contact", &self.address))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_contact_with_referer(
        &self,
        body: &serde_json::Value,
        referer: &str,
    ) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/contact", &self.address))
            .header("Referer", referer)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_chat_request(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/save-chat-request", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_chat_request_raw(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/save-chat-request", &self.address))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_chat_request_with_headers(
        &self,
        body: &serde_json::Value,
        headers: &[(&'static str, &'static str)],
    ) -> reqwest::Response {
        let mut request = self
            .api_client
            .post(&format!("{}/api/save-chat-request", &self.address))
            .json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn get_booking_url(&self) -> reqwest::Response {
        self.request(Method::GET, "/api/booking-url").await
    }

    pub async fn request(&self, method: Method, path: &str) -> reqwest::Response {
        self.api_client
            .request(method, &format!("{}{}", &self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn stored_submissions(&self) -> Vec<SubmissionPayload> {
        FallbackStore::new(self.store_path.clone())
            .read_all()
            .await
            .expect("Failed to read the fallback store.")
    }

    /// Bodies of every request the webhook received, in order.
    pub async fn webhook_bodies(&self) -> Vec<serde_json::Value> {
        self.webhook_server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .collect()
    }
}

pub fn when_delivering_to_the_webhook() -> MockBuilder {
    Mock::given(path(WEBHOOK_PATH)).and(method("POST"))
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Webhook pointing at a mock server, a fresh fallback store and a booking
/// URL; `customise` can change any of them before the app starts.
pub async fn spawn_app_with(customise: impl FnOnce(&mut Settings)) -> TestApp {
    Lazy::force(&TRACING);

    let webhook_server = MockServer::start().await;

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Use a random OS port
        c.application.port = 0;
        c.delivery.webhook_url = Some(Secret::new(format!(
            "{}{}",
            webhook_server.uri(),
            WEBHOOK_PATH
        )));
        c.delivery.timeout_milliseconds = 2000;
        c.delivery.store_when_unconfigured = false;
        c.fallback_store.path = std::env::temp_dir()
            .join(format!("site-intake-{}", Uuid::new_v4()))
            .join("chatbot")
            .join("requests.json");
        c.booking.booking_url = Some(BOOKING_URL.to_string());
        customise(&mut c);
        c
    };

    let application = Application::build(configuration.clone())
        .await
        .expect("Failed to build application.");
    let application_port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address: format!("http://127.0.0.1:{}", application_port),
        port: application_port,
        webhook_server,
        store_path: configuration.fallback_store.path,
        api_client,
    }
}

pub async fn assert_json_response(
    response: reqwest::Response,
    expected_status: u16,
    expected_body: serde_json::Value,
) {
    assert_eq!(response.status().as_u16(), expected_status);
    let body: serde_json::Value = response.json().await.expect("Response body is not JSON.");
    assert_eq!(body, expected_body);
}
