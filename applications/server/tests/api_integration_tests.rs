/// API integration tests
/// Tests complete HTTP request/response cycles with real database
mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::{create_test_app, TestApp, ADMIN_EMAIL};
use serde_json::json;
use std::time::Duration;
use tower::util::ServiceExt;

/// Wait until the background notifier has seen `subject`
async fn wait_for_notification(app: &TestApp, subject: &str) {
    for _ in 0..200 {
        if app.notifier.subjects().iter().any(|s| s == subject) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("notification {:?} never sent", subject);
}

/// Set a worker's balance and withdrawal PIN as admin
async fn fund_with_pin(app: &TestApp, admin: &str, email: &str, balance: f64, pin: &str) {
    let (status, _) = app
        .send(
            Method::POST,
            "/api/admin/wallet",
            Some(admin),
            Some(json!({ "email": email, "balance": balance })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/admin/verify-pin",
            Some(admin),
            Some(json!({ "email": email, "pin": pin })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

fn withdrawal(amount: f64, pin: &str) -> serde_json::Value {
    json!({
        "amount": amount,
        "crypto": "USDT",
        "address": "TXYZ1234567890",
        "pin": pin,
    })
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app().await;

    let (status, body) = app.send(Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = create_test_app().await;

    let (status, body) = app.send(Method::GET, "/api/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = app
        .send(Method::GET, "/api/wallet", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_legacy_token_header_is_accepted() {
    let app = create_test_app().await;
    let (token, _) = app.register("legacy@example.com").await;

    let request = Request::builder()
        .uri("/api/users/profile")
        .header("x-auth-token", token)
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_and_login() {
    let app = create_test_app().await;
    let (_, user_id) = app.register("Ada@Example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": common::TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user_id.as_str());
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["walletBalance"], 0.0);

    let token = body["token"].as_str().unwrap();
    let (status, me) = app.send(Method::GET, "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user_id.as_str());

    wait_for_notification(&app, "User Login").await;
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let app = create_test_app().await;
    app.register("dup@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "profileType": "customer",
                "firstName": "Other",
                "lastName": "Person",
                "email": "DUP@example.com",
                "phone": "1",
                "gender": "male",
                "country": "NL",
                "password": "x",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let app = create_test_app().await;
    app.register("ada@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "wrong" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_admin_login() {
    let app = create_test_app().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["token"].is_null());

    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": common::ADMIN_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["isAdmin"], true);

    let principal = app
        .auth_service
        .authenticate(body["token"].as_str().unwrap())
        .unwrap();
    assert!(principal.is_admin);
}

#[tokio::test]
async fn test_admin_routes_reject_workers() {
    let app = create_test_app().await;
    let (token, _) = app.register("worker@example.com").await;

    let (status, _) = app
        .send(Method::GET, "/api/admin/users", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/admin/tasks",
            Some(&token),
            Some(json!({ "title": "Sneaky", "amount": 1000.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

/// Register, start, attempt, approve, and check the wallet and inbox
#[tokio::test]
async fn test_submission_workflow() {
    let app = create_test_app().await;
    let admin = app.admin_token().await;
    let (token, user_id) = app.register("worker@example.com").await;
    let task_id = app.create_task(&admin, "Label images", 50.0).await;

    let mut events = app.events.subscribe();

    let (status, body) = app
        .send(Method::POST, &format!("/api/tasks/start/{}", task_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task started");
    wait_for_notification(&app, "Task Started").await;

    let (status, _) = app
        .send(Method::POST, &format!("/api/tasks/attempt/{}", task_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    wait_for_notification(&app, "Task Attempted").await;

    let (status, task) = app
        .send(Method::GET, &format!("/api/tasks/{}", task_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["submissions"][0]["status"], "completed");
    assert_eq!(task["submissions"][0]["approved"], false);

    let submission_id = app.pending_submission(&admin, &task_id).await;
    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/admin/approve-submission/{}", submission_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Submission approved and wallet updated");

    assert_eq!(app.balance(&token).await, 50.0);

    let event = events.recv().await.unwrap();
    assert_eq!(event.user_id.as_str(), user_id);
    assert_eq!(event.new_balance.cents(), 5000);

    let (status, messages) = app
        .send(Method::GET, "/api/users/messages", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 1);
    let content = messages[0]["content"].as_str().unwrap();
    assert!(content.contains("50"));
    assert!(content.contains("Label images"));

    // Approved entries drop out of the default review list
    let (_, pending) = app
        .send(Method::GET, "/api/admin/task-submissions", Some(&admin), None)
        .await;
    assert!(pending.as_array().unwrap().is_empty());

    let (_, all) = app
        .send(
            Method::GET,
            "/api/admin/task-submissions?includeApproved=true",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0]["approved"], true);
}

#[tokio::test]
async fn test_approving_twice_credits_once() {
    let app = create_test_app().await;
    let admin = app.admin_token().await;
    let (token, _) = app.register("worker@example.com").await;
    let task_id = app.create_task(&admin, "Transcribe audio", 12.5).await;

    app.send(Method::POST, &format!("/api/tasks/start/{}", task_id), Some(&token), None)
        .await;
    app.send(Method::POST, &format!("/api/tasks/attempt/{}", task_id), Some(&token), None)
        .await;
    let submission_id = app.pending_submission(&admin, &task_id).await;
    let uri = format!("/api/admin/approve-submission/{}", submission_id);

    let (status, _) = app.send(Method::POST, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(Method::POST, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Submission already approved");

    assert_eq!(app.balance(&token).await, 12.5);

    // Approved submissions can no longer be deleted
    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/admin/submission/{}", submission_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_workflow_order_is_enforced() {
    let app = create_test_app().await;
    let admin = app.admin_token().await;
    let (token, _) = app.register("worker@example.com").await;
    let task_id = app.create_task(&admin, "Write summary", 20.0).await;
    let start = format!("/api/tasks/start/{}", task_id);
    let attempt = format!("/api/tasks/attempt/{}", task_id);

    // Attempt before start
    let (status, _) = app.send(Method::POST, &attempt, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::POST, &start, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Start twice
    let (status, _) = app.send(Method::POST, &start, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::POST, &attempt, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Attempt twice
    let (status, _) = app.send(Method::POST, &attempt, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown task
    let (status, body) = app
        .send(Method::POST, "/api/tasks/start/no-such-task", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task not found");
}

#[tokio::test]
async fn test_unknown_submission_is_not_found() {
    let app = create_test_app().await;
    let admin = app.admin_token().await;

    let (status, _) = app
        .send(Method::POST, "/api/admin/approve-submission/missing", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::DELETE, "/api/admin/submission/missing", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Balance 50, PIN 1234: withdraw 40, then 40 more fails
#[tokio::test]
async fn test_withdrawal_flow() {
    let app = create_test_app().await;
    let admin = app.admin_token().await;
    let (token, _) = app.register("worker@example.com").await;
    fund_with_pin(&app, &admin, "worker@example.com", 50.0, "1234").await;

    let (status, body) = app
        .send(Method::POST, "/api/wallet/withdraw", Some(&token), Some(withdrawal(40.0, "1234")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Withdrawal processed");
    assert_eq!(body["walletBalance"], 10.0);
    assert_eq!(app.balance(&token).await, 10.0);
    wait_for_notification(&app, "Withdrawal Confirmed").await;

    let (status, body) = app
        .send(Method::POST, "/api/wallet/withdraw", Some(&token), Some(withdrawal(40.0, "1234")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Insufficient funds");
    assert_eq!(app.balance(&token).await, 10.0);

    let (status, ledger) = app
        .send(Method::GET, "/api/wallet/withdrawals", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ledger.as_array().unwrap().len(), 1);

    let (_, messages) = app
        .send(Method::GET, "/api/users/messages", Some(&token), None)
        .await;
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0]["content"].as_str().unwrap().contains("USDT"));
}

#[tokio::test]
async fn test_wrong_pin_leaves_balance_untouched() {
    let app = create_test_app().await;
    let admin = app.admin_token().await;
    let (token, _) = app.register("worker@example.com").await;
    fund_with_pin(&app, &admin, "worker@example.com", 50.0, "1234").await;

    let (status, body) = app
        .send(Method::POST, "/api/wallet/withdraw", Some(&token), Some(withdrawal(10.0, "9999")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid PIN");
    assert_eq!(app.balance(&token).await, 50.0);

    let (_, messages) = app
        .send(Method::GET, "/api/users/messages", Some(&token), None)
        .await;
    assert!(messages.as_array().unwrap().is_empty());

    let (status, _) = app
        .send(Method::POST, "/api/users/verify-pin", Some(&token), Some(json!({ "pin": "1234" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(Method::POST, "/api/users/verify-pin", Some(&token), Some(json!({ "pin": "0000" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid PIN");
}

#[tokio::test]
async fn test_withdrawal_without_pin_is_rejected() {
    let app = create_test_app().await;
    let admin = app.admin_token().await;
    let (token, _) = app.register("worker@example.com").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/admin/wallet",
            Some(&admin),
            Some(json!({ "email": "worker@example.com", "balance": 50.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(Method::POST, "/api/wallet/withdraw", Some(&token), Some(withdrawal(10.0, "1234")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No PIN set for user");
    assert_eq!(app.balance(&token).await, 50.0);

    let (status, body) = app
        .send(Method::POST, "/api/users/verify-pin", Some(&token), Some(json!({ "pin": "1234" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No PIN set for user");
}

#[tokio::test]
async fn test_edit_balance_publishes_wallet_update() {
    let app = create_test_app().await;
    let admin = app.admin_token().await;
    let (token, user_id) = app.register("worker@example.com").await;

    let mut events = app.events.subscribe();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/wallet",
            Some(&admin),
            Some(json!({ "email": "worker@example.com", "balance": 75.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Wallet updated");
    assert_eq!(body["walletBalance"], 75.5);

    let event = events.recv().await.unwrap();
    assert_eq!(event.user_id.as_str(), user_id);
    assert_eq!(event.new_balance.cents(), 7550);

    let frame = serde_json::to_value(event.frame()).unwrap();
    assert_eq!(frame["event"], "walletUpdate");
    assert_eq!(frame["payload"]["newBalance"], 75.5);

    assert_eq!(app.balance(&token).await, 75.5);
}

#[tokio::test]
async fn test_oversized_amounts_are_rejected() {
    let app = create_test_app().await;
    let admin = app.admin_token().await;
    let (token, _) = app.register("worker@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/wallet",
            Some(&admin),
            Some(json!({ "email": "worker@example.com", "balance": 9.2e16 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("too large"));

    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/tasks",
            Some(&admin),
            Some(json!({ "title": "Jackpot", "amount": 9.2e16 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert_eq!(app.balance(&token).await, 0.0);
}

#[tokio::test]
async fn test_malformed_json_uses_error_shape() {
    let app = create_test_app().await;
    let (token, _) = app.register("worker@example.com").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/wallet/withdraw")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());

    // Well-formed JSON missing a required field
    let (status, body) = app
        .send(Method::POST, "/api/wallet/withdraw", Some(&token), Some(json!({ "amount": 5.0 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_admin_messages_and_payment_urls() {
    let app = create_test_app().await;
    let admin = app.admin_token().await;
    let (token, _) = app.register("worker@example.com").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/admin/message",
            Some(&admin),
            Some(json!({ "email": "worker@example.com", "message": "Welcome aboard" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, messages) = app
        .send(Method::GET, "/api/users/messages", Some(&token), None)
        .await;
    assert_eq!(messages[0]["content"], "Welcome aboard");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/admin/payment-url",
            Some(&admin),
            Some(json!({
                "email": "worker@example.com",
                "slot": 0,
                "url": "https://pay.example.com/abc",
                "approved": true,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, urls) = app
        .send(Method::GET, "/api/users/payment-url", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(urls.as_array().unwrap().len(), 1);
    assert_eq!(urls[0]["url"], "https://pay.example.com/abc");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/admin/message",
            Some(&admin),
            Some(json!({ "email": "nobody@example.com", "message": "hi" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_task_management() {
    let app = create_test_app().await;
    let admin = app.admin_token().await;
    let task_id = app.create_task(&admin, "Draft", 5.0).await;

    let (status, task) = app
        .send(
            Method::PUT,
            &format!("/api/admin/tasks/{}", task_id),
            Some(&admin),
            Some(json!({ "title": "Final", "amount": 7.25 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["title"], "Final");
    assert_eq!(task["amount"], 7.25);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/admin/tasks/{}/url", task_id),
            Some(&admin),
            Some(json!({ "externalUrl": "https://forms.example.com/t1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, tasks) = app.send(Method::GET, "/api/admin/tasks", Some(&admin), None).await;
    assert_eq!(tasks[0]["externalUrl"], "https://forms.example.com/t1");

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/admin/tasks/{}", task_id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/admin/tasks/{}", task_id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
