use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, QueryOrder};
use serde::Serialize;
use serde_json::json;

use crate::error::{DomainError, DomainResult};
use super::{audit_log, staff_notification};

/// Upper bound for a single bonus or dock, in cents.
pub const MAX_ADJUSTMENT: i64 = 1_000_000;

/// Signed pay-ledger entry: positive amounts are bonuses, negative docks.
/// Ledger entries are additive to the base `pay_per_ticket` earnings and are
/// reported separately.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "staff_pay_adjustments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub staff_id: i64,
    pub amount: i64,
    pub reason: String,
    pub actor_user_id: Option<i64>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::staff_member::Entity",
        from = "Column::StaffId",
        to = "super::staff_member::Column::Id"
    )]
    Staff,
}

impl Related<super::staff_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    fn validate_amount(amount: i64) -> DomainResult<()> {
        if amount <= 0 || amount > MAX_ADJUSTMENT {
            return Err(DomainError::validation(format!(
                "Amount must be between 1 and {MAX_ADJUSTMENT}"
            )));
        }
        Ok(())
    }

    async fn insert_entry(
        db: &DbConn,
        staff_id: i64,
        amount: i64,
        reason: &str,
        actor_user_id: i64,
    ) -> Result<Model, DbErr> {
        let active = ActiveModel {
            staff_id: Set(staff_id),
            amount: Set(amount),
            reason: Set(reason.to_owned()),
            actor_user_id: Set(Some(actor_user_id)),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        active.insert(db).await
    }

    /// Awards a bonus: one positive ledger entry, one `pay.bonus`
    /// notification, one audit entry.
    pub async fn bonus(
        db: &DbConn,
        staff_id: i64,
        amount: i64,
        reason: &str,
        actor_user_id: i64,
    ) -> DomainResult<Model> {
        Self::validate_amount(amount)?;
        if reason.trim().is_empty() {
            return Err(DomainError::validation("A reason is required"));
        }
        super::staff_member::Model::find_by_id(db, staff_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Staff member not found"))?;

        let entry = Self::insert_entry(db, staff_id, amount, reason, actor_user_id).await?;

        staff_notification::Model::create(
            db,
            staff_id,
            "pay.bonus",
            &format!("You received a bonus of {amount}: {reason}"),
            Some(json!({ "amount": amount, "reason": reason })),
        )
        .await?;

        audit_log::Model::record(
            db,
            Some(actor_user_id),
            "staff.pay.bonus",
            "staff",
            staff_id,
            Some(json!({ "amount": amount, "reason": reason })),
        )
        .await;

        Ok(entry)
    }

    /// Applies a dock: one negative ledger entry, one `pay.dock`
    /// notification, one audit entry. `amount` is given positive.
    pub async fn dock(
        db: &DbConn,
        staff_id: i64,
        amount: i64,
        reason: &str,
        actor_user_id: i64,
    ) -> DomainResult<Model> {
        Self::validate_amount(amount)?;
        if reason.trim().is_empty() {
            return Err(DomainError::validation("A reason is required"));
        }
        super::staff_member::Model::find_by_id(db, staff_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Staff member not found"))?;

        let entry = Self::insert_entry(db, staff_id, -amount, reason, actor_user_id).await?;

        staff_notification::Model::create(
            db,
            staff_id,
            "pay.dock",
            &format!("Your pay was docked by {amount}: {reason}"),
            Some(json!({ "amount": amount, "reason": reason })),
        )
        .await?;

        audit_log::Model::record(
            db,
            Some(actor_user_id),
            "staff.pay.dock",
            "staff",
            staff_id,
            Some(json!({ "amount": amount, "reason": reason })),
        )
        .await;

        Ok(entry)
    }

    pub async fn list_for_staff(db: &DbConn, staff_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::StaffId.eq(staff_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(db)
            .await
    }

    /// Sum of ledger entries for a staff member in the given time range.
    pub async fn sum_in_range(
        db: &DbConn,
        staff_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, DbErr> {
        let rows = Entity::find()
            .filter(Column::StaffId.eq(staff_id))
            .filter(Column::CreatedAt.gte(from))
            .filter(Column::CreatedAt.lt(to))
            .all(db)
            .await?;
        Ok(rows.iter().map(|r| r.amount).sum())
    }
}
