//! Staff lifecycle surface: capability gating, panel visibility, the
//! last-write-wins claim behavior and one-time transcript generation.

use axum::http::StatusCode;
use db::models::ticket::{self, TicketSource};
use db::models::ticket_claim::ClaimAction;
use db::models::{panel_role_access, ticket_panel};
use db::permissions::{Capability, CapabilitySet};
use serde_json::json;
use util::state::AppState;

use super::helpers::*;

/// Seeds statuses, one panel and a ticket from "alice".
async fn seed_ticket(state: &AppState) -> (ticket_panel::Model, ticket::Model) {
    db::test_utils::make_statuses(state.db()).await;
    let panel = db::test_utils::make_panel(state.db(), "General").await;
    let alice = db::test_utils::make_user(state.db(), "alice").await;
    let (ticket, _) = ticket::Model::create(
        state.db(),
        panel.id,
        &alice,
        None,
        "Cannot log in",
        "Help",
        TicketSource::Web,
    )
    .await
    .unwrap();
    (panel, ticket)
}

fn triage_caps() -> CapabilitySet {
    CapabilitySet::from_caps([
        Capability::ViewTickets,
        Capability::ReplyTickets,
        Capability::ClaimTickets,
        Capability::EscalateTickets,
        Capability::CloseTickets,
        Capability::GenerateTranscripts,
    ])
}

async fn make_triage_staff(
    state: &AppState,
    username: &str,
) -> (db::models::staff_member::Model, String) {
    let user = db::test_utils::make_user(state.db(), username).await;
    let role = db::test_utils::make_role(state.db(), &format!("{username}-role"), Some(5), &triage_caps()).await;
    let staff = db::test_utils::make_staff(state.db(), &user, &role, 100).await;
    (staff, cookie_for(user.id))
}

#[tokio::test]
async fn the_staff_surface_is_forbidden_to_plain_users() {
    let (app, state) = test_app().await;
    let user = db::test_utils::make_user(state.db(), "plain").await;

    let (status, _) = get_json(&app, "/api/staff/tickets", Some(&cookie_for(user.id))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn operations_require_their_capability() {
    let (app, state) = test_app().await;
    let (_panel, ticket) = seed_ticket(&state).await;

    let user = db::test_utils::make_user(state.db(), "limited").await;
    let role = db::test_utils::make_role(
        state.db(),
        "Viewer",
        Some(5),
        &CapabilitySet::from_caps([Capability::ViewTickets]),
    )
    .await;
    db::test_utils::make_staff(state.db(), &user, &role, 0).await;
    let cookie = cookie_for(user.id);

    // Viewing works, claiming does not.
    let (status, _) = get_json(
        &app,
        &format!("/api/staff/tickets/{}", ticket.public_id),
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/staff/tickets/{}/claim", ticket.public_id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn concurrent_claims_are_last_write_wins_with_full_history() {
    let (app, state) = test_app().await;
    let (_panel, ticket) = seed_ticket(&state).await;

    let (first, first_cookie) = make_triage_staff(&state, "bob").await;
    let (second, second_cookie) = make_triage_staff(&state, "carol").await;

    let uri = format!("/api/staff/tickets/{}/claim", ticket.public_id);

    let (status, body) = request(&app, "POST", &uri, Some(&first_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assigned_staff_id"], first.id);

    // A second staff member claims immediately after: the assignment moves,
    // and a second history row is appended.
    let (status, body) = request(&app, "POST", &uri, Some(&second_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assigned_staff_id"], second.id);

    let history = db::models::ticket_claim::Model::history_for_ticket(state.db(), ticket.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|row| row.action == ClaimAction::Claim));
    assert_eq!(history[0].staff_id, first.id);
    assert_eq!(history[1].staff_id, second.id);
}

#[tokio::test]
async fn panel_restrictions_hide_tickets_from_unlisted_roles() {
    let (app, state) = test_app().await;
    let (_panel, restricted_ticket) = seed_ticket(&state).await;

    // Restrict the panel to some other role.
    let other_role = db::test_utils::make_role(state.db(), "Elsewhere", Some(1), &triage_caps()).await;
    panel_role_access::Model::set_for_panel(
        state.db(),
        restricted_ticket.panel_id,
        &[other_role.id],
    )
    .await
    .unwrap();

    let (_staff, cookie) = make_triage_staff(&state, "bob").await;

    // The queue is empty for staff whose role is not allow-listed.
    let (status, body) = get_json(&app, "/api/staff/tickets", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tickets"].as_array().unwrap().len(), 0);

    // Direct access is a 403.
    let (status, _) = get_json(
        &app,
        &format!("/api/staff/tickets/{}", restricted_ticket.public_id),
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins see through restrictions.
    let admin_user = db::test_utils::make_user(state.db(), "root").await;
    let admin_role = db::test_utils::make_admin_role(state.db()).await;
    db::test_utils::make_staff(state.db(), &admin_user, &admin_role, 0).await;

    let (status, body) = get_json(&app, "/api/staff/tickets", Some(&cookie_for(admin_user.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tickets"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn escalation_requires_visibility_of_the_target_panel() {
    let (app, state) = test_app().await;
    let (_panel, ticket) = seed_ticket(&state).await;

    let hidden = db::test_utils::make_panel(state.db(), "Hidden").await;
    let other_role = db::test_utils::make_role(state.db(), "Other", Some(1), &triage_caps()).await;
    panel_role_access::Model::set_for_panel(state.db(), hidden.id, &[other_role.id])
        .await
        .unwrap();

    let (_staff, cookie) = make_triage_staff(&state, "bob").await;

    let (status, _) = post_json(
        &app,
        &format!("/api/staff/tickets/{}/escalate", ticket.public_id),
        Some(&cookie),
        json!({ "panel_id": hidden.id }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn escalation_clears_the_assignment() {
    let (app, state) = test_app().await;
    let (_panel, ticket) = seed_ticket(&state).await;
    let second_panel = db::test_utils::make_panel(state.db(), "Tier 2").await;

    let (staff, cookie) = make_triage_staff(&state, "bob").await;

    let claim_uri = format!("/api/staff/tickets/{}/claim", ticket.public_id);
    let (status, body) = request(&app, "POST", &claim_uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assigned_staff_id"], staff.id);

    let (status, body) = post_json(
        &app,
        &format!("/api/staff/tickets/{}/escalate", ticket.public_id),
        Some(&cookie),
        json!({ "panel_id": second_panel.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["panel_id"], second_panel.id);
    assert!(body["data"]["assigned_staff_id"].is_null());
}

#[tokio::test]
async fn closing_generates_one_transcript_and_reclosing_none() {
    let (app, state) = test_app().await;
    let (_panel, ticket) = seed_ticket(&state).await;
    let (_staff, cookie) = make_triage_staff(&state, "bob").await;

    let close_uri = format!("/api/staff/tickets/{}/close", ticket.public_id);
    let transcripts_uri = format!("/api/staff/tickets/{}/transcripts", ticket.public_id);

    let (status, _) = request(&app, "POST", &close_uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(&app, &transcripts_uri, Some(&cookie)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["trigger"], "close");

    // Re-closing an already-closed ticket must not add an automatic snapshot.
    let (status, _) = request(&app, "POST", &close_uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = get_json(&app, &transcripts_uri, Some(&cookie)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // A manual request always creates a new one.
    let (status, _) = request(&app, "POST", &transcripts_uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = get_json(&app, &transcripts_uri, Some(&cookie)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn transcripts_render_as_escaped_html() {
    let (app, state) = test_app().await;

    db::test_utils::make_statuses(state.db()).await;
    let panel = db::test_utils::make_panel(state.db(), "General").await;
    let alice = db::test_utils::make_user(state.db(), "alice").await;
    let (ticket, _) = ticket::Model::create(
        state.db(),
        panel.id,
        &alice,
        None,
        "<script>alert(1)</script>",
        "<b>bold</b>",
        TicketSource::Web,
    )
    .await
    .unwrap();

    let (_staff, cookie) = make_triage_staff(&state, "bob").await;

    let transcripts_uri = format!("/api/staff/tickets/{}/transcripts", ticket.public_id);
    let (status, body) = request(&app, "POST", &transcripts_uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let transcript_id = body["data"]["id"].as_i64().unwrap();

    let uri = format!("{transcripts_uri}/{transcript_id}?format=html");
    let request = axum::http::Request::builder()
        .method("GET")
        .uri(&uri)
        .header(axum::http::header::COOKIE, &cookie)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.clone(), request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
}

#[tokio::test]
async fn staff_replies_append_and_keep_status() {
    let (app, state) = test_app().await;
    let (_panel, ticket) = seed_ticket(&state).await;
    let (_staff, cookie) = make_triage_staff(&state, "bob").await;

    let (status, _) = post_json(
        &app,
        &format!("/api/staff/tickets/{}/messages", ticket.public_id),
        Some(&cookie),
        json!({ "body": "We are on it" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get_json(
        &app,
        &format!("/api/staff/tickets/{}", ticket.public_id),
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["data"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1]["author_type"], "staff");
    assert_eq!(body["data"]["status_id"], ticket.status_id);
}
