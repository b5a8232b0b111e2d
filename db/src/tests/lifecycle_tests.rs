//! End-to-end tests of the ticket state machine against an in-memory
//! database: creation, reply, claim/unclaim, assignment, escalation, close
//! and transcript behavior, plus the audit side effects of each transition.

use crate::error::DomainError;
use crate::models::{
    audit_log, staff_member, ticket, ticket_claim, ticket_message, ticket_status,
    ticket_transcript,
};
use crate::models::ticket::TicketSource;
use crate::models::ticket_claim::ClaimAction;
use crate::models::ticket_message::AuthorType;
use crate::models::ticket_transcript::TranscriptTrigger;
use crate::permissions::CapabilitySet;
use crate::test_utils::*;

use sea_orm::DatabaseConnection;

async fn setup_ticket(db: &DatabaseConnection) -> ticket::Model {
    make_statuses(db).await;
    let panel = make_panel(db, "General").await;
    let creator = make_user(db, "alice").await;
    let (ticket, _msg) = ticket::Model::create(
        db,
        panel.id,
        &creator,
        None,
        "Cannot log in",
        "Help",
        TicketSource::Web,
    )
    .await
    .expect("ticket creation failed");
    ticket
}

#[tokio::test]
async fn create_allocates_public_id_and_default_status() {
    let db = setup_test_db().await;
    let (open, _closed) = make_statuses(&db).await;
    let panel = make_panel(&db, "General").await;
    let creator = make_user(&db, "alice").await;

    let (ticket, message) = ticket::Model::create(
        &db,
        panel.id,
        &creator,
        None,
        "Cannot log in",
        "Help",
        TicketSource::Web,
    )
    .await
    .unwrap();

    assert_eq!(ticket.public_id.len(), 8);
    assert!(ticket.public_id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(ticket.status_id, open.id);
    assert!(ticket.closed_at.is_none());
    assert_eq!(message.author_type, AuthorType::User);
    assert_eq!(message.body, "Help");

    let messages = ticket_message::Model::find_all_for_ticket(&db, ticket.id)
        .await
        .unwrap();
    assert_eq!(messages.len(), 1);

    let audit = audit_log::Model::find_for_entity(&db, "ticket", ticket.id)
        .await
        .unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "ticket.created");
}

#[tokio::test]
async fn create_without_statuses_is_a_conflict() {
    let db = setup_test_db().await;
    let panel = make_panel(&db, "General").await;
    let creator = make_user(&db, "alice").await;

    let err = ticket::Model::create(
        &db,
        panel.id,
        &creator,
        None,
        "Subject",
        "Body",
        TicketSource::Web,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn create_rejects_empty_subject_and_body() {
    let db = setup_test_db().await;
    make_statuses(&db).await;
    let panel = make_panel(&db, "General").await;
    let creator = make_user(&db, "alice").await;

    let err = ticket::Model::create(&db, panel.id, &creator, None, "  ", "Body", TicketSource::Web)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let err = ticket::Model::create(&db, panel.id, &creator, None, "Subject", "", TicketSource::Web)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn reply_appends_and_bumps_activity() {
    let db = setup_test_db().await;
    let ticket = setup_ticket(&db).await;
    let staff_user = make_user(&db, "bob").await;

    let message = ticket::Model::reply(
        &db,
        ticket.id,
        staff_user.id,
        AuthorType::Staff,
        "On it",
        TicketSource::Web,
        None,
    )
    .await
    .unwrap();

    assert_eq!(message.author_type, AuthorType::Staff);

    let refreshed = ticket::Model::find_by_id(&db, ticket.id).await.unwrap().unwrap();
    assert!(refreshed.last_message_at >= ticket.last_message_at);
    assert_eq!(refreshed.status_id, ticket.status_id);

    let messages = ticket_message::Model::find_all_for_ticket(&db, ticket.id)
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
}

#[tokio::test]
async fn double_claim_is_last_write_wins_with_full_history() {
    let db = setup_test_db().await;
    let ticket = setup_ticket(&db).await;

    let role = make_role(&db, "Support", Some(5), &CapabilitySet::All).await;
    let first = make_staff(&db, &make_user(&db, "bob").await, &role, 100).await;
    let second = make_staff(&db, &make_user(&db, "carol").await, &role, 100).await;

    let after_first = ticket::Model::claim(&db, ticket.id, &first).await.unwrap();
    assert_eq!(after_first.assigned_staff_id, Some(first.id));

    let after_second = ticket::Model::claim(&db, ticket.id, &second).await.unwrap();
    assert_eq!(after_second.assigned_staff_id, Some(second.id));

    let history = ticket_claim::Model::history_for_ticket(&db, ticket.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|c| c.action == ClaimAction::Claim));
}

#[tokio::test]
async fn redundant_unclaim_still_appends_history() {
    let db = setup_test_db().await;
    let ticket = setup_ticket(&db).await;
    let role = make_role(&db, "Support", Some(5), &CapabilitySet::All).await;
    let staff = make_staff(&db, &make_user(&db, "bob").await, &role, 100).await;

    let updated = ticket::Model::unclaim(&db, ticket.id, &staff).await.unwrap();
    assert_eq!(updated.assigned_staff_id, None);

    let history = ticket_claim::Model::history_for_ticket(&db, ticket.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, ClaimAction::Unclaim);
}

#[tokio::test]
async fn assign_rejects_inactive_staff() {
    let db = setup_test_db().await;
    let ticket = setup_ticket(&db).await;
    let role = make_role(&db, "Support", Some(5), &CapabilitySet::All).await;
    let staff = make_staff(&db, &make_user(&db, "bob").await, &role, 100).await;
    let manager = make_user(&db, "dana").await;

    staff_member::Model::set_active(&db, staff.id, false).await.unwrap();

    let err = ticket::Model::assign(&db, ticket.id, Some(staff.id), manager.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    // Clearing the assignment is always allowed.
    let updated = ticket::Model::assign(&db, ticket.id, None, manager.id).await.unwrap();
    assert_eq!(updated.assigned_staff_id, None);
}

#[tokio::test]
async fn escalate_moves_panel_and_clears_assignment() {
    let db = setup_test_db().await;
    let ticket = setup_ticket(&db).await;
    let role = make_role(&db, "Support", Some(5), &CapabilitySet::All).await;
    let staff = make_staff(&db, &make_user(&db, "bob").await, &role, 100).await;
    let billing = make_panel(&db, "Billing").await;

    ticket::Model::claim(&db, ticket.id, &staff).await.unwrap();
    let updated = ticket::Model::escalate(&db, ticket.id, billing.id, staff.user_id)
        .await
        .unwrap();

    assert_eq!(updated.panel_id, billing.id);
    assert_eq!(updated.assigned_staff_id, None);

    let err = ticket::Model::escalate(&db, ticket.id, billing.id, staff.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn first_close_generates_exactly_one_automatic_transcript() {
    let db = setup_test_db().await;
    let ticket = setup_ticket(&db).await;
    let actor = make_user(&db, "bob").await;

    let closed = ticket::Model::close(&db, ticket.id, actor.id).await.unwrap();
    let closed_at = closed.closed_at.expect("closed_at must be set");

    let transcripts = ticket_transcript::Model::find_for_ticket(&db, ticket.id)
        .await
        .unwrap();
    assert_eq!(transcripts.len(), 1);
    assert_eq!(transcripts[0].trigger, TranscriptTrigger::Close);

    // Re-closing must neither regenerate the transcript nor move closed_at.
    let reclosed = ticket::Model::close(&db, ticket.id, actor.id).await.unwrap();
    assert_eq!(reclosed.closed_at, Some(closed_at));

    let transcripts = ticket_transcript::Model::find_for_ticket(&db, ticket.id)
        .await
        .unwrap();
    assert_eq!(transcripts.len(), 1);
}

#[tokio::test]
async fn manual_transcript_is_always_a_new_row() {
    let db = setup_test_db().await;
    let ticket = setup_ticket(&db).await;
    let actor = make_user(&db, "bob").await;

    ticket_transcript::Model::generate(&db, ticket.id, TranscriptTrigger::Manual)
        .await
        .unwrap();
    ticket::Model::close(&db, ticket.id, actor.id).await.unwrap();
    ticket_transcript::Model::generate(&db, ticket.id, TranscriptTrigger::Manual)
        .await
        .unwrap();

    let transcripts = ticket_transcript::Model::find_for_ticket(&db, ticket.id)
        .await
        .unwrap();
    assert_eq!(transcripts.len(), 3);
    let manual = transcripts
        .iter()
        .filter(|t| t.trigger == TranscriptTrigger::Manual)
        .count();
    assert_eq!(manual, 2);
}

#[tokio::test]
async fn transcript_snapshot_contains_full_history_in_order() {
    let db = setup_test_db().await;
    let ticket = setup_ticket(&db).await;
    let role = make_role(&db, "Support", Some(5), &CapabilitySet::All).await;
    let staff = make_staff(&db, &make_user(&db, "bob").await, &role, 100).await;

    ticket::Model::reply(
        &db,
        ticket.id,
        staff.user_id,
        AuthorType::Staff,
        "Looking into it",
        TicketSource::Web,
        None,
    )
    .await
    .unwrap();
    ticket::Model::claim(&db, ticket.id, &staff).await.unwrap();

    let transcript = ticket_transcript::Model::generate(&db, ticket.id, TranscriptTrigger::Manual)
        .await
        .unwrap();

    let snapshot: serde_json::Value = serde_json::from_str(&transcript.snapshot).unwrap();
    assert_eq!(snapshot["schema_version"], 1);
    assert_eq!(snapshot["ticket"]["public_id"], ticket.public_id);
    assert_eq!(snapshot["messages"].as_array().unwrap().len(), 2);
    assert_eq!(snapshot["claims"].as_array().unwrap().len(), 1);
    // ticket.created, ticket.reply, ticket.claim
    assert_eq!(snapshot["audit"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn close_without_closed_status_is_a_conflict() {
    let db = setup_test_db().await;
    ticket_status::Model::create(&db, "Open", "open", true, false, 0)
        .await
        .unwrap();
    let panel = make_panel(&db, "General").await;
    let creator = make_user(&db, "alice").await;
    let (ticket, _) = ticket::Model::create(
        &db,
        panel.id,
        &creator,
        None,
        "Subject",
        "Body",
        TicketSource::Web,
    )
    .await
    .unwrap();

    let err = ticket::Model::close(&db, ticket.id, creator.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn reopening_clears_closed_at() {
    let db = setup_test_db().await;
    let ticket = setup_ticket(&db).await;
    let actor = make_user(&db, "bob").await;
    let open = ticket_status::Model::find_default_open(&db).await.unwrap().unwrap();

    ticket::Model::close(&db, ticket.id, actor.id).await.unwrap();
    let reopened = ticket::Model::set_status(&db, ticket.id, open.id, actor.id)
        .await
        .unwrap();

    assert!(reopened.closed_at.is_none());
}

#[tokio::test]
async fn setting_default_open_clears_the_previous_default() {
    let db = setup_test_db().await;
    let (open, closed) = make_statuses(&db).await;

    ticket_status::Model::update(&db, closed.id, None, Some(true), None, None)
        .await
        .unwrap();

    let old = ticket_status::Model::find_by_id(&db, open.id).await.unwrap().unwrap();
    assert!(!old.is_default_open);

    let new = ticket_status::Model::find_by_id(&db, closed.id).await.unwrap().unwrap();
    assert!(new.is_default_open);
}

#[tokio::test]
async fn deactivating_staff_unassigns_their_tickets() {
    let db = setup_test_db().await;
    let ticket = setup_ticket(&db).await;
    let role = make_role(&db, "Support", Some(5), &CapabilitySet::All).await;
    let staff = make_staff(&db, &make_user(&db, "bob").await, &role, 100).await;

    ticket::Model::claim(&db, ticket.id, &staff).await.unwrap();
    staff_member::Model::set_active(&db, staff.id, false).await.unwrap();

    let refreshed = ticket::Model::find_by_id(&db, ticket.id).await.unwrap().unwrap();
    assert_eq!(refreshed.assigned_staff_id, None);

    assert!(
        staff_member::Model::find_active_by_user_id(&db, staff.user_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn each_transition_audits_exactly_once() {
    let db = setup_test_db().await;
    let ticket = setup_ticket(&db).await;
    let role = make_role(&db, "Support", Some(5), &CapabilitySet::All).await;
    let staff = make_staff(&db, &make_user(&db, "bob").await, &role, 100).await;

    ticket::Model::claim(&db, ticket.id, &staff).await.unwrap();
    ticket::Model::unclaim(&db, ticket.id, &staff).await.unwrap();
    ticket::Model::close(&db, ticket.id, staff.user_id).await.unwrap();

    let audit = audit_log::Model::find_for_entity(&db, "ticket", ticket.id)
        .await
        .unwrap();
    let actions: Vec<&str> = audit.iter().map(|a| a.action.as_str()).collect();
    assert_eq!(
        actions,
        vec!["ticket.created", "ticket.claim", "ticket.unclaim", "ticket.close"]
    );
}
