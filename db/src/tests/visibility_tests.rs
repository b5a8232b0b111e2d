//! Panel visibility control: unrestricted panels are visible to every staff
//! member, allow-list rows restrict to the listed roles, and admins always
//! see everything.

use crate::models::{panel_role_access, ticket_panel};
use crate::permissions::CapabilitySet;
use crate::test_utils::*;

#[tokio::test]
async fn panel_without_rows_is_visible_to_all_staff() {
    let db = setup_test_db().await;
    let panel = make_panel(&db, "General").await;
    let support = make_role(&db, "Support", Some(5), &CapabilitySet::empty()).await;
    let triage = make_role(&db, "Triage", Some(9), &CapabilitySet::empty()).await;

    assert!(ticket_panel::Model::staff_can_access(&db, &support, panel.id).await.unwrap());
    assert!(ticket_panel::Model::staff_can_access(&db, &triage, panel.id).await.unwrap());
}

#[tokio::test]
async fn allow_list_restricts_to_listed_roles_plus_admins() {
    let db = setup_test_db().await;
    let panel = make_panel(&db, "Billing").await;
    let support = make_role(&db, "Support", Some(5), &CapabilitySet::empty()).await;
    let triage = make_role(&db, "Triage", Some(9), &CapabilitySet::empty()).await;
    let admin = make_admin_role(&db).await;

    panel_role_access::Model::set_for_panel(&db, panel.id, &[support.id])
        .await
        .unwrap();

    assert!(ticket_panel::Model::staff_can_access(&db, &support, panel.id).await.unwrap());
    assert!(!ticket_panel::Model::staff_can_access(&db, &triage, panel.id).await.unwrap());
    assert!(ticket_panel::Model::staff_can_access(&db, &admin, panel.id).await.unwrap());
}

#[tokio::test]
async fn clearing_the_allow_list_restores_visibility() {
    let db = setup_test_db().await;
    let panel = make_panel(&db, "Billing").await;
    let support = make_role(&db, "Support", Some(5), &CapabilitySet::empty()).await;
    let triage = make_role(&db, "Triage", Some(9), &CapabilitySet::empty()).await;

    panel_role_access::Model::set_for_panel(&db, panel.id, &[support.id])
        .await
        .unwrap();
    assert!(!ticket_panel::Model::staff_can_access(&db, &triage, panel.id).await.unwrap());

    panel_role_access::Model::set_for_panel(&db, panel.id, &[]).await.unwrap();
    assert!(ticket_panel::Model::staff_can_access(&db, &triage, panel.id).await.unwrap());
}

#[tokio::test]
async fn accessible_panels_filters_and_orders() {
    let db = setup_test_db().await;
    let support = make_role(&db, "Support", Some(5), &CapabilitySet::empty()).await;
    let admin = make_admin_role(&db).await;

    let general = ticket_panel::Model::create(&db, "General", true, 2).await.unwrap();
    let billing = ticket_panel::Model::create(&db, "Billing", true, 1).await.unwrap();
    let hidden = ticket_panel::Model::create(&db, "Escalations", true, 0).await.unwrap();
    let inactive = ticket_panel::Model::create(&db, "Archive", false, 3).await.unwrap();

    // Restrict "Escalations" to a role the support role does not hold.
    let lead = make_role(&db, "Lead", Some(1), &CapabilitySet::empty()).await;
    panel_role_access::Model::set_for_panel(&db, hidden.id, &[lead.id])
        .await
        .unwrap();

    let visible = ticket_panel::Model::accessible_panels(&db, &support).await.unwrap();
    let ids: Vec<i64> = visible.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![billing.id, general.id]);
    assert!(!ids.contains(&inactive.id));

    let all = ticket_panel::Model::accessible_panels(&db, &admin).await.unwrap();
    let ids: Vec<i64> = all.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![hidden.id, billing.id, general.id]);
}
