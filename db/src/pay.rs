//! Derived monthly pay views: per-staff earnings and the role-grouped
//! leaderboard.
//!
//! Base earnings are `claimed tickets this calendar month × pay_per_ticket`;
//! ledger adjustments (bonuses/docks) are reported alongside and only summed
//! into `total` here, in the consuming view. The leaderboard ranks by
//! distinct tickets replied to this month, not by pay.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use sea_orm::{DbConn, DbErr, EntityTrait};
use serde::Serialize;

use crate::models::{staff_member, staff_pay_adjustment, ticket_claim, ticket_message, user};

/// Start of the calendar month containing `now`, and start of the next month.
pub fn month_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .unwrap();
    let (next_year, next_month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    let end = Utc.with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0).unwrap();
    (start, end)
}

#[derive(Debug, Serialize)]
pub struct EarningsView {
    pub staff_id: i64,
    pub month: String,
    pub claimed_tickets: u64,
    pub pay_per_ticket: i64,
    pub base_pay: i64,
    pub adjustments: i64,
    pub total: i64,
}

/// Current-month earnings for one staff member.
pub async fn monthly_earnings(
    db: &DbConn,
    staff: &staff_member::Model,
) -> Result<EarningsView, DbErr> {
    let now = Utc::now();
    let (from, to) = month_bounds(now);

    let claimed = ticket_claim::Model::count_claims_in_range(db, staff.id, from, to).await?;
    let base_pay = claimed as i64 * staff.pay_per_ticket;
    let adjustments =
        staff_pay_adjustment::Model::sum_in_range(db, staff.id, from, to).await?;

    Ok(EarningsView {
        staff_id: staff.id,
        month: format!("{:04}-{:02}", now.year(), now.month()),
        claimed_tickets: claimed,
        pay_per_ticket: staff.pay_per_ticket,
        base_pay,
        adjustments,
        total: base_pay + adjustments,
    })
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub staff_id: i64,
    pub name: String,
    pub answered_tickets: u64,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardGroup {
    pub role_id: i64,
    pub role_name: String,
    pub entries: Vec<LeaderboardEntry>,
}

/// Role-grouped leaderboard of active staff, ranked within each group by
/// distinct tickets replied to this month.
pub async fn leaderboard(db: &DbConn) -> Result<Vec<LeaderboardGroup>, DbErr> {
    let now = Utc::now();
    let (from, to) = month_bounds(now);

    let mut groups: Vec<LeaderboardGroup> = Vec::new();
    for (staff, role) in staff_member::Model::list_all(db).await? {
        if !staff.active {
            continue;
        }
        let Some(role) = role else { continue };

        let answered =
            ticket_message::Model::distinct_tickets_replied(db, staff.user_id, from, to).await?;

        let name = match &staff.nickname {
            Some(nick) => nick.clone(),
            None => user::Entity::find_by_id(staff.user_id)
                .one(db)
                .await?
                .map(|u| u.username)
                .unwrap_or_default(),
        };

        let entry = LeaderboardEntry {
            staff_id: staff.id,
            name,
            answered_tickets: answered,
        };

        match groups.iter_mut().find(|g| g.role_id == role.id) {
            Some(group) => group.entries.push(entry),
            None => groups.push(LeaderboardGroup {
                role_id: role.id,
                role_name: role.name.clone(),
                entries: vec![entry],
            }),
        }
    }

    for group in &mut groups {
        group
            .entries
            .sort_by(|a, b| b.answered_tickets.cmp(&a.answered_tickets));
    }

    Ok(groups)
}
