//! Admin configuration surface: hierarchy-gated role management, privilege
//! non-escalation, and the pay ledger endpoints.

use axum::http::StatusCode;
use db::permissions::{Capability, CapabilitySet};
use serde_json::json;
use util::state::AppState;

use super::helpers::*;

async fn make_manager(
    state: &AppState,
    username: &str,
    sort_order: i32,
    caps: &CapabilitySet,
) -> (db::models::staff_member::Model, String) {
    let user = db::test_utils::make_user(state.db(), username).await;
    let role =
        db::test_utils::make_role(state.db(), &format!("{username}-role"), Some(sort_order), caps)
            .await;
    let staff = db::test_utils::make_staff(state.db(), &user, &role, 0).await;
    (staff, cookie_for(user.id))
}

fn manage_roles() -> CapabilitySet {
    CapabilitySet::from_caps([Capability::ManageRoles])
}

#[tokio::test]
async fn role_deletion_follows_the_hierarchy_rule() {
    let (app, state) = test_app().await;

    let (_staff, cookie) = make_manager(&state, "manager", 5, &manage_roles()).await;
    let senior = db::test_utils::make_role(state.db(), "Senior", Some(3), &CapabilitySet::empty()).await;
    let junior = db::test_utils::make_role(state.db(), "Junior", Some(9), &CapabilitySet::empty()).await;

    // Rank 5 cannot delete rank 3.
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/admin/roles/{}", senior.id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Rank 5 deletes rank 9 with no references.
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/admin/roles/{}", junior.id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(&app, "/api/admin/roles", Some(&cookie)).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert!(!names.contains(&"Junior"));
    assert!(names.contains(&"Senior"));
}

#[tokio::test]
async fn a_referenced_role_cannot_be_deleted() {
    let (app, state) = test_app().await;

    let (_staff, cookie) = make_manager(&state, "manager", 5, &manage_roles()).await;
    let junior = db::test_utils::make_role(state.db(), "Junior", Some(9), &CapabilitySet::empty()).await;
    let member = db::test_utils::make_user(state.db(), "member").await;
    db::test_utils::make_staff(state.db(), &member, &junior, 0).await;

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/admin/roles/{}", junior.id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn grants_cannot_escalate_beyond_the_actors_permissions() {
    let (app, state) = test_app().await;

    let caps = CapabilitySet::from_caps([Capability::ManageRoles, Capability::ClaimTickets]);
    let (_staff, cookie) = make_manager(&state, "manager", 5, &caps).await;

    // Granting a permission the actor holds is fine.
    let (status, _) = post_json(
        &app,
        "/api/admin/roles",
        Some(&cookie),
        json!({ "name": "Helpers", "sort_order": 9, "permissions": ["tickets.claim"] }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Granting one the actor lacks is privilege escalation.
    let (status, _) = post_json(
        &app,
        "/api/admin/roles",
        Some(&cookie),
        json!({ "name": "Sneaky", "sort_order": 9, "permissions": ["staff.manage"] }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // So is the wildcard.
    let (status, _) = post_json(
        &app,
        "/api/admin/roles",
        Some(&cookie),
        json!({ "name": "Sneakier", "sort_order": 9, "permissions": "*" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_admins_may_mint_admin_roles() {
    let (app, state) = test_app().await;

    let (_staff, cookie) = make_manager(&state, "manager", 5, &manage_roles()).await;
    let (status, _) = post_json(
        &app,
        "/api/admin/roles",
        Some(&cookie),
        json!({ "name": "Shadow", "permissions": [], "is_admin": true }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_user = db::test_utils::make_user(state.db(), "root").await;
    let admin_role = db::test_utils::make_admin_role(state.db()).await;
    db::test_utils::make_staff(state.db(), &admin_user, &admin_role, 0).await;

    let (status, _) = post_json(
        &app,
        "/api/admin/roles",
        Some(&cookie_for(admin_user.id)),
        json!({ "name": "Deputy", "permissions": "*", "is_admin": true }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn the_admin_role_is_never_a_valid_target_for_non_admins() {
    let (app, state) = test_app().await;

    // The actor's wildcard role outranks everything ranked, but the admin
    // role is still off limits.
    let (_staff, cookie) = make_manager(&state, "lead", 0, &CapabilitySet::All).await;
    let admin_role = db::test_utils::make_admin_role(state.db()).await;

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/admin/roles/{}", admin_role.id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/admin/roles/{}", admin_role.id),
        Some(&cookie),
        Some(json!({ "name": "Demoted" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn bonus_creates_ledger_notification_and_audit_rows() {
    let (app, state) = test_app().await;

    let caps = CapabilitySet::from_caps([Capability::ManagePay]);
    let (_manager, cookie) = make_manager(&state, "manager", 1, &caps).await;

    let worker = db::test_utils::make_user(state.db(), "worker").await;
    let worker_role =
        db::test_utils::make_role(state.db(), "Support", Some(5), &CapabilitySet::empty()).await;
    let worker_staff = db::test_utils::make_staff(state.db(), &worker, &worker_role, 100).await;

    let (status, _) = post_json(
        &app,
        &format!("/api/admin/staff/{}/pay/bonus", worker_staff.id),
        Some(&cookie),
        json!({ "amount": 50, "reason": "great work" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let ledger = db::models::staff_pay_adjustment::Model::list_for_staff(state.db(), worker_staff.id)
        .await
        .unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].amount, 50);

    let inbox =
        db::models::staff_notification::Model::list_for_staff(state.db(), worker_staff.id, false)
            .await
            .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, "pay.bonus");

    let audit = db::models::audit_log::Model::find_for_entity(state.db(), "staff", worker_staff.id)
        .await
        .unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "staff.pay.bonus");
}

#[tokio::test]
async fn pay_adjustments_are_hierarchy_gated_and_validated() {
    let (app, state) = test_app().await;

    let caps = CapabilitySet::from_caps([Capability::ManagePay]);
    let (_manager, cookie) = make_manager(&state, "manager", 5, &caps).await;

    // Target outranks the actor: denied.
    let boss = db::test_utils::make_user(state.db(), "boss").await;
    let boss_role = db::test_utils::make_role(state.db(), "Lead", Some(1), &CapabilitySet::empty()).await;
    let boss_staff = db::test_utils::make_staff(state.db(), &boss, &boss_role, 0).await;

    let (status, _) = post_json(
        &app,
        &format!("/api/admin/staff/{}/pay/bonus", boss_staff.id),
        Some(&cookie),
        json!({ "amount": 50, "reason": "nice try" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Out-of-range amounts are rejected before any rows are written.
    let worker = db::test_utils::make_user(state.db(), "worker").await;
    let worker_role =
        db::test_utils::make_role(state.db(), "Support", Some(9), &CapabilitySet::empty()).await;
    let worker_staff = db::test_utils::make_staff(state.db(), &worker, &worker_role, 0).await;

    let (status, _) = post_json(
        &app,
        &format!("/api/admin/staff/{}/pay/dock", worker_staff.id),
        Some(&cookie),
        json!({ "amount": 2_000_000, "reason": "too much" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pay_rate_changes_leave_a_rate_notification() {
    let (app, state) = test_app().await;

    let caps = CapabilitySet::from_caps([Capability::ManageStaff]);
    let (_manager, cookie) = make_manager(&state, "manager", 1, &caps).await;

    let worker = db::test_utils::make_user(state.db(), "worker").await;
    let worker_role =
        db::test_utils::make_role(state.db(), "Support", Some(5), &CapabilitySet::empty()).await;
    let worker_staff = db::test_utils::make_staff(state.db(), &worker, &worker_role, 100).await;

    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/admin/staff/{}", worker_staff.id),
        Some(&cookie),
        Some(json!({ "pay_per_ticket": 250 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let inbox =
        db::models::staff_notification::Model::list_for_staff(state.db(), worker_staff.id, false)
            .await
            .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, "pay.rate");
}

#[tokio::test]
async fn suspending_staff_unassigns_their_tickets() {
    let (app, state) = test_app().await;

    db::test_utils::make_statuses(state.db()).await;
    let panel = db::test_utils::make_panel(state.db(), "General").await;
    let alice = db::test_utils::make_user(state.db(), "alice").await;
    let (ticket, _) = db::models::ticket::Model::create(
        state.db(),
        panel.id,
        &alice,
        None,
        "Subject",
        "Body",
        db::models::ticket::TicketSource::Web,
    )
    .await
    .unwrap();

    let caps = CapabilitySet::from_caps([Capability::ManageStaff]);
    let (_manager, cookie) = make_manager(&state, "manager", 1, &caps).await;

    let worker = db::test_utils::make_user(state.db(), "worker").await;
    let worker_role =
        db::test_utils::make_role(state.db(), "Support", Some(5), &CapabilitySet::empty()).await;
    let worker_staff = db::test_utils::make_staff(state.db(), &worker, &worker_role, 0).await;

    db::models::ticket::Model::claim(state.db(), ticket.id, &worker_staff)
        .await
        .unwrap();

    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/admin/staff/{}", worker_staff.id),
        Some(&cookie),
        Some(json!({ "active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let reloaded = db::models::ticket::Model::find_by_id(state.db(), ticket.id)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.assigned_staff_id.is_none());
}

#[tokio::test]
async fn the_audit_view_is_capability_gated() {
    let (app, state) = test_app().await;

    let (_staff, cookie) = make_manager(&state, "viewer", 5, &CapabilitySet::empty()).await;
    let (status, _) = get_json(&app, "/api/admin/audit", Some(&cookie)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let caps = CapabilitySet::from_caps([Capability::ViewAuditLog]);
    let (_auditor, cookie) = make_manager(&state, "auditor", 5, &caps).await;
    let (status, body) = get_json(&app, "/api/admin/audit", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["entries"].is_array());
}
