use reqwest::{Method, StatusCode};

use crate::helpers::{assert_json_response, spawn_app, spawn_app_with};

fn valid_body() -> serde_json::Value {
    serde_json::json!({
        "name": "Ada",
        "email": "ada@engine.io",
        "company": "Analytical Engines",
        "message": "Could you help us with messaging?"
    })
}

#[tokio::test]
async fn valid_lead_is_saved_to_the_store() {
    // Arrange
    let app = spawn_app().await;
    let before = chrono::Utc::now();

    // Act
    let response = app.post_chat_request(&valid_body()).await;

    // Assert
    assert_json_response(response, 200, serde_json::json!({ "success": true })).await;
    let stored = app.stored_submissions().await;
    assert_eq!(stored.len(), 1);
    let lead = &stored[0];
    assert_eq!(lead.name, "Ada");
    assert_eq!(lead.email, "ada@engine.io");
    assert_eq!(lead.company, "Analytical Engines");
    assert_eq!(lead.message, "Could you help us with messaging?");
    assert_eq!(lead.source, "website");
    assert_eq!(lead.ip.as_deref(), Some("127.0.0.1"));
    assert!(lead.submitted_at >= before);
}

#[tokio::test]
async fn leads_are_appended_in_order() {
    // Arrange
    let app = spawn_app().await;

    // Act
    for name in ["First", "Second", "Third"] {
        let mut body = valid_body();
        body["name"] = serde_json::json!(name);
        let response = app.post_chat_request(&body).await;
        assert_eq!(StatusCode::OK, response.status());
    }

    // Assert
    let names: Vec<_> = app
        .stored_submissions()
        .await
        .into_iter()
        .map(|lead| lead.name)
        .collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
}

#[tokio::test]
async fn source_and_ip_come_from_request_headers() {
    // Arrange
    let app = spawn_app().await;
    let mut body = valid_body();
    body["ip"] = serde_json::json!("6.6.6.6");
    body["source"] = serde_json::json!("forged");

    // Act
    let response = app
        .post_chat_request_with_headers(
            &body,
            &[
                ("Referer", "https://site.example/pricing"),
                ("X-Forwarded-For", "203.0.113.7, 10.0.0.1"),
            ],
        )
        .await;

    // Assert
    assert_eq!(StatusCode::OK, response.status());
    let stored = app.stored_submissions().await;
    assert_eq!(stored[0].source, "https://site.example/pricing");
    assert_eq!(stored[0].ip.as_deref(), Some("203.0.113.7, 10.0.0.1"));
}

#[tokio::test]
async fn markup_is_stripped_before_saving() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .post_chat_request(&serde_json::json!({
            "name": "<script>Ada</script>",
            "email": "ada@engine.io",
            "company": "<b>Engines</b>\u{0000}",
            "message": "Could you <em>help</em> us?\n"
        }))
        .await;

    // Assert
    assert_eq!(StatusCode::OK, response.status());
    let stored = app.stored_submissions().await;
    assert_eq!(stored[0].name, "scriptAda/script");
    assert_eq!(stored[0].company, "bEngines/b");
    assert_eq!(stored[0].message, "Could you emhelp/em us?");
}

#[tokio::test]
async fn invalid_email_and_short_message_are_both_reported() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .post_chat_request(&serde_json::json!({
            "name": "A",
            "email": "bad-email",
            "message": "short"
        }))
        .await;

    // Assert
    assert_json_response(
        response,
        400,
        serde_json::json!({
            "success": false,
            "error": "A valid email is required. Message should include at least 10 characters."
        }),
    )
    .await;
    assert!(app.stored_submissions().await.is_empty());
}

#[tokio::test]
async fn invalid_leads_are_rejected() {
    // Arrange
    let app = spawn_app().await;
    let test_cases = vec![
        (
            serde_json::json!({
                "name": "",
                "email": "ada@engine.io",
                "message": "Could you help us with messaging?"
            }),
            "Name is required.",
        ),
        (
            serde_json::json!({
                "name": "Ada",
                "email": "ada@engine.io",
                "company": "c".repeat(121),
                "message": "Could you help us with messaging?"
            }),
            "Company name is too long.",
        ),
        (
            serde_json::json!({
                "name": "Ada",
                "email": "ada@engine.io",
                "message": "<<<<<<<<<<<<<<<<Hi>>>>>>>>>>>>>>>>>>"
            }),
            "Message should include at least 10 characters.",
        ),
    ];

    for (invalid_body, error_message) in test_cases {
        // Act
        let response = app.post_chat_request(&invalid_body).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            invalid_body
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], error_message);
    }
    assert!(app.stored_submissions().await.is_empty());
}

#[tokio::test]
async fn empty_body_reports_every_missing_field() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.post_chat_request_raw("").await;

    // Assert
    assert_json_response(
        response,
        400,
        serde_json::json!({
            "success": false,
            "error": "Name is required. A valid email is required. \
                      Message should include at least 10 characters."
        }),
    )
    .await;
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.post_chat_request_raw("name=Ada").await;

    // Assert
    assert_json_response(
        response,
        400,
        serde_json::json!({ "success": false, "error": "Invalid JSON payload." }),
    )
    .await;
}

#[tokio::test]
async fn unwritable_store_returns_a_generic_500() {
    // Arrange
    let app = spawn_app().await;
    // A directory where the store file should be.
    std::fs::create_dir_all(&app.store_path).unwrap();

    // Act
    let response = app.post_chat_request(&valid_body()).await;

    // Assert
    assert_json_response(
        response,
        500,
        serde_json::json!({ "success": false, "error": "Unable to save request." }),
    )
    .await;
}

#[tokio::test]
async fn oversized_body_is_rejected_as_a_client_error() {
    // Arrange
    let app = spawn_app_with(|c| c.application.max_body_bytes = 1024).await;
    let mut body = valid_body();
    body["message"] = serde_json::json!("x".repeat(4 * 1024));

    // Act
    let response = app.post_chat_request_raw(body.to_string()).await;

    // Assert
    assert_json_response(
        response,
        413,
        serde_json::json!({ "success": false, "error": "Request body is too large." }),
    )
    .await;
    assert!(app.stored_submissions().await.is_empty());
}

#[tokio::test]
async fn bodies_within_the_limit_are_accepted() {
    // Arrange
    let app = spawn_app_with(|c| c.application.max_body_bytes = 1024).await;

    // Act
    let response = app.post_chat_request(&valid_body()).await;

    // Assert
    assert_eq!(StatusCode::OK, response.status());
}

#[tokio::test]
async fn leads_are_saved_even_without_a_webhook() {
    // Arrange
    let app = spawn_app_with(|c| c.delivery.webhook_url = None).await;

    // Act
    let response = app.post_chat_request(&valid_body()).await;

    // Assert
    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(app.stored_submissions().await.len(), 1);
}

#[tokio::test]
async fn options_returns_204_with_cors_headers() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.request(Method::OPTIONS, "/api/save-chat-request").await;

    // Assert
    assert_eq!(StatusCode::NO_CONTENT, response.status());
    assert_eq!(response.headers()["Allow"], "POST, OPTIONS");
    assert_eq!(response.headers()["Access-Control-Allow-Headers"], "Content-Type");
    assert!(response.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn other_methods_are_not_allowed() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.request(Method::GET, "/api/save-chat-request").await;

    // Assert
    assert_eq!(response.headers()["Allow"], "POST, OPTIONS");
    assert_json_response(
        response,
        405,
        serde_json::json!({ "success": false, "error": "Method not allowed." }),
    )
    .await;
}
