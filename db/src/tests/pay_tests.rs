//! Pay ledger, notifications and the derived monthly views.

use crate::error::DomainError;
use crate::models::ticket::TicketSource;
use crate::models::ticket_message::AuthorType;
use crate::models::{audit_log, staff_notification, staff_pay_adjustment, ticket};
use crate::pay;
use crate::permissions::CapabilitySet;
use crate::test_utils::*;

#[tokio::test]
async fn bonus_creates_ledger_entry_notification_and_audit() {
    let db = setup_test_db().await;
    let role = make_role(&db, "Support", Some(5), &CapabilitySet::empty()).await;
    let staff = make_staff(&db, &make_user(&db, "bob").await, &role, 100).await;
    let manager = make_user(&db, "dana").await;

    let entry = staff_pay_adjustment::Model::bonus(&db, staff.id, 50, "great work", manager.id)
        .await
        .unwrap();
    assert_eq!(entry.amount, 50);

    let notifications = staff_notification::Model::list_for_staff(&db, staff.id, true)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, "pay.bonus");

    let audit = audit_log::Model::find_for_entity(&db, "staff", staff.id).await.unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "staff.pay.bonus");
}

#[tokio::test]
async fn dock_stores_a_negative_amount() {
    let db = setup_test_db().await;
    let role = make_role(&db, "Support", Some(5), &CapabilitySet::empty()).await;
    let staff = make_staff(&db, &make_user(&db, "bob").await, &role, 100).await;
    let manager = make_user(&db, "dana").await;

    let entry = staff_pay_adjustment::Model::dock(&db, staff.id, 30, "late replies", manager.id)
        .await
        .unwrap();
    assert_eq!(entry.amount, -30);

    let notifications = staff_notification::Model::list_for_staff(&db, staff.id, true)
        .await
        .unwrap();
    assert_eq!(notifications[0].kind, "pay.dock");
}

#[tokio::test]
async fn adjustment_amounts_are_bounded() {
    let db = setup_test_db().await;
    let role = make_role(&db, "Support", Some(5), &CapabilitySet::empty()).await;
    let staff = make_staff(&db, &make_user(&db, "bob").await, &role, 100).await;
    let manager = make_user(&db, "dana").await;

    for bad in [0, -5, staff_pay_adjustment::MAX_ADJUSTMENT + 1] {
        let err = staff_pay_adjustment::Model::bonus(&db, staff.id, bad, "x", manager.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}

#[tokio::test]
async fn monthly_earnings_combine_claims_and_adjustments() {
    let db = setup_test_db().await;
    make_statuses(&db).await;
    let panel = make_panel(&db, "General").await;
    let role = make_role(&db, "Support", Some(5), &CapabilitySet::All).await;
    let staff = make_staff(&db, &make_user(&db, "bob").await, &role, 100).await;
    let manager = make_user(&db, "dana").await;

    for i in 0..3 {
        let creator = make_user(&db, &format!("user{i}")).await;
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
        ticket::Model::claim(&db, ticket.id, &staff).await.unwrap();
    }

    staff_pay_adjustment::Model::bonus(&db, staff.id, 50, "great work", manager.id)
        .await
        .unwrap();

    let earnings = pay::monthly_earnings(&db, &staff).await.unwrap();
    assert_eq!(earnings.claimed_tickets, 3);
    assert_eq!(earnings.base_pay, 300);
    assert_eq!(earnings.adjustments, 50);
    assert_eq!(earnings.total, 350);
}

#[tokio::test]
async fn leaderboard_groups_by_role_and_ranks_by_distinct_replies() {
    let db = setup_test_db().await;
    make_statuses(&db).await;
    let panel = make_panel(&db, "General").await;
    let role = make_role(&db, "Support", Some(5), &CapabilitySet::All).await;
    let busy = make_staff(&db, &make_user(&db, "bob").await, &role, 100).await;
    let quiet = make_staff(&db, &make_user(&db, "carol").await, &role, 100).await;

    let mut tickets = Vec::new();
    for i in 0..2 {
        let creator = make_user(&db, &format!("user{i}")).await;
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
        tickets.push(ticket);
    }

    for ticket in &tickets {
        ticket::Model::reply(
            &db,
            ticket.id,
            busy.user_id,
            AuthorType::Staff,
            "hello",
            TicketSource::Web,
            None,
        )
        .await
        .unwrap();
    }
    // Two replies on the same ticket count once.
    ticket::Model::reply(
        &db,
        tickets[0].id,
        busy.user_id,
        AuthorType::Staff,
        "again",
        TicketSource::Web,
        None,
    )
    .await
    .unwrap();
    ticket::Model::reply(
        &db,
        tickets[0].id,
        quiet.user_id,
        AuthorType::Staff,
        "me too",
        TicketSource::Web,
        None,
    )
    .await
    .unwrap();

    let board = pay::leaderboard(&db).await.unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].role_id, role.id);
    assert_eq!(board[0].entries.len(), 2);
    assert_eq!(board[0].entries[0].staff_id, busy.id);
    assert_eq!(board[0].entries[0].answered_tickets, 2);
    assert_eq!(board[0].entries[1].staff_id, quiet.id);
    assert_eq!(board[0].entries[1].answered_tickets, 1);
}

#[tokio::test]
async fn notifications_are_scoped_to_their_owner() {
    let db = setup_test_db().await;
    let role = make_role(&db, "Support", Some(5), &CapabilitySet::empty()).await;
    let bob = make_staff(&db, &make_user(&db, "bob").await, &role, 100).await;
    let carol = make_staff(&db, &make_user(&db, "carol").await, &role, 100).await;
    let manager = make_user(&db, "dana").await;

    staff_pay_adjustment::Model::bonus(&db, bob.id, 10, "x", manager.id).await.unwrap();
    let bobs = staff_notification::Model::list_for_staff(&db, bob.id, true).await.unwrap();
    assert_eq!(bobs.len(), 1);

    // Carol cannot read or ack Bob's notification.
    let err = staff_notification::Model::mark_read(&db, carol.id, bobs[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    staff_notification::Model::mark_read(&db, bob.id, bobs[0].id).await.unwrap();
    let unread = staff_notification::Model::list_for_staff(&db, bob.id, true).await.unwrap();
    assert!(unread.is_empty());
}
