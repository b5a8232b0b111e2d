//! End-user ticket surface: creation, listing, detail, and the realtime
//! notification published on creation.

use axum::http::StatusCode;
use serde_json::json;
use util::events::TicketEventKind;

use super::helpers::*;

#[tokio::test]
async fn create_ticket_end_to_end() {
    let (app, state) = test_app().await;

    let (open, _closed) = db::test_utils::make_statuses(state.db()).await;
    let panel = db::test_utils::make_panel(state.db(), "General").await;
    let user = db::test_utils::make_user(state.db(), "alice").await;
    let cookie = cookie_for(user.id);

    let (status, body) = post_json(
        &app,
        "/api/tickets",
        Some(&cookie),
        json!({
            "panel_id": panel.id,
            "subject": "Cannot log in",
            "message": "Help"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let public_id = body["data"]["public_id"].as_str().unwrap().to_string();
    assert_eq!(public_id.len(), 8);
    assert!(public_id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(body["data"]["status_id"], open.id);

    // The first message is recorded with author_type user.
    let (status, body) = get_json(&app, &format!("/api/tickets/{public_id}"), Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["data"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["author_type"], "user");
    assert_eq!(messages[0]["body"], "Help");

    // And the ticket shows up in the creator's list.
    let (status, body) = get_json(&app, "/api/tickets", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_requires_a_known_active_panel() {
    let (app, state) = test_app().await;
    db::test_utils::make_statuses(state.db()).await;
    let user = db::test_utils::make_user(state.db(), "alice").await;

    let (status, _) = post_json(
        &app,
        "/api/tickets",
        Some(&cookie_for(user.id)),
        json!({ "panel_id": 999, "subject": "S", "message": "M" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn a_foreign_ticket_reads_as_not_found() {
    let (app, state) = test_app().await;

    db::test_utils::make_statuses(state.db()).await;
    let panel = db::test_utils::make_panel(state.db(), "General").await;
    let alice = db::test_utils::make_user(state.db(), "alice").await;
    let mallory = db::test_utils::make_user(state.db(), "mallory").await;

    let (ticket, _) = db::models::ticket::Model::create(
        state.db(),
        panel.id,
        &alice,
        None,
        "Private",
        "Body",
        db::models::ticket::TicketSource::Web,
    )
    .await
    .unwrap();

    let (status, _) = get_json(
        &app,
        &format!("/api/tickets/{}", ticket.public_id),
        Some(&cookie_for(mallory.id)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ticket_creation_notifies_subscribers() {
    let (app, state) = test_app().await;

    db::test_utils::make_statuses(state.db()).await;
    let panel = db::test_utils::make_panel(state.db(), "General").await;
    let user = db::test_utils::make_user(state.db(), "alice").await;

    let (_subscription, mut rx) = state.events().register(Box::new(|_| true));

    let (status, body) = post_json(
        &app,
        "/api/tickets",
        Some(&cookie_for(user.id)),
        json!({ "panel_id": panel.id, "subject": "S", "message": "M" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let event = rx.try_recv().expect("a ticket.created event should be published");
    assert_eq!(event.kind, TicketEventKind::TicketCreated);
    assert_eq!(event.creator_user_id, user.id);
    assert_eq!(
        event.ticket_public_id,
        body["data"]["public_id"].as_str().unwrap()
    );
}

#[tokio::test]
async fn the_ticket_surface_requires_authentication() {
    let (app, _state) = test_app().await;

    let (status, _) = get_json(&app, "/api/tickets", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post_json(&app, "/api/tickets", None, json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
