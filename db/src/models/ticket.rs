use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::{Display, EnumString};

use crate::error::{DomainError, DomainResult};
use super::audit_log;
use super::ticket_claim::{self, ClaimAction};
use super::ticket_message::{self, AuthorType};
use super::ticket_status;
use super::ticket_transcript::{self, TranscriptTrigger};

/// A support ticket and its lifecycle state machine.
///
/// Staff-mutable fields are `status_id`, `assigned_staff_id` and (via
/// escalation) `panel_id`; everything else is fixed at creation. Every
/// transition appends exactly one audit entry. Transitions are independent
/// read-then-write sequences: concurrent claim/assign/status calls on the
/// same ticket are last-write-wins.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub public_id: String,
    pub panel_id: i64,
    pub status_id: i64,

    pub creator_user_id: i64,
    pub creator_email: Option<String>,
    pub subject: String,
    pub source: TicketSource,

    pub assigned_staff_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub last_message_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ticket_source")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TicketSource {
    #[sea_orm(string_value = "web")]
    Web,

    #[sea_orm(string_value = "discord")]
    Discord,

    #[sea_orm(string_value = "bot")]
    Bot,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ticket_panel::Entity",
        from = "Column::PanelId",
        to = "super::ticket_panel::Column::Id"
    )]
    Panel,

    #[sea_orm(
        belongs_to = "super::ticket_status::Entity",
        from = "Column::StatusId",
        to = "super::ticket_status::Column::Id"
    )]
    Status,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorUserId",
        to = "super::user::Column::Id"
    )]
    Creator,

    #[sea_orm(
        belongs_to = "super::staff_member::Entity",
        from = "Column::AssignedStaffId",
        to = "super::staff_member::Column::Id"
    )]
    AssignedStaff,

    #[sea_orm(has_many = "super::ticket_message::Entity")]
    Message,
}

impl Related<super::ticket_panel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Panel.def()
    }
}

impl Related<super::ticket_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl Related<super::ticket_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Message.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn random_hex_id() -> String {
    format!("{:08x}", rand::random::<u32>())
}

impl Model {
    /// Allocates an opaque public id: 8 random hex chars, collision-checked
    /// and retried a handful of times, then accepted regardless (the
    /// collision probability is negligible at this length).
    async fn allocate_public_id(db: &DbConn) -> Result<String, DbErr> {
        let mut candidate = random_hex_id();
        for _ in 0..5 {
            let taken = Entity::find()
                .filter(Column::PublicId.eq(candidate.clone()))
                .count(db)
                .await?
                > 0;
            if !taken {
                break;
            }
            candidate = random_hex_id();
        }
        Ok(candidate)
    }

    /// Creates a ticket with its first message.
    ///
    /// Requires a panel that exists and is accepting tickets, a non-empty
    /// subject and message, and a reachable creator (external identity or
    /// email). The initial status is the configured default-open row.
    pub async fn create(
        db: &DbConn,
        panel_id: i64,
        creator: &super::user::Model,
        creator_email: Option<&str>,
        subject: &str,
        body: &str,
        source: TicketSource,
    ) -> DomainResult<(Model, ticket_message::Model)> {
        if subject.trim().is_empty() {
            return Err(DomainError::validation("Subject must not be empty"));
        }
        if body.trim().is_empty() {
            return Err(DomainError::validation("Message must not be empty"));
        }
        if creator.identity_id.is_none() && creator_email.is_none() && creator.email.is_none() {
            return Err(DomainError::validation(
                "An email address or external identity is required to open a ticket",
            ));
        }

        let panel = super::ticket_panel::Model::find_by_id(db, panel_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Panel not found"))?;
        if !panel.active {
            return Err(DomainError::validation("Panel is not accepting tickets"));
        }

        let status = ticket_status::Model::find_default_open(db)
            .await?
            .ok_or_else(|| DomainError::conflict("No ticket statuses configured"))?;

        let now = Utc::now();
        let public_id = Self::allocate_public_id(db).await?;

        let active = ActiveModel {
            public_id: Set(public_id),
            panel_id: Set(panel.id),
            status_id: Set(status.id),
            creator_user_id: Set(creator.id),
            creator_email: Set(creator_email.map(str::to_owned).or_else(|| creator.email.clone())),
            subject: Set(subject.to_owned()),
            source: Set(source),
            assigned_staff_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            closed_at: Set(None),
            last_message_at: Set(now),
            ..Default::default()
        };

        let ticket = active.insert(db).await?;

        let message = ticket_message::Model::create(
            db,
            ticket.id,
            creator.id,
            AuthorType::User,
            body,
            source,
            None,
        )
        .await?;

        audit_log::Model::record(
            db,
            Some(creator.id),
            "ticket.created",
            "ticket",
            ticket.id,
            Some(json!({ "public_id": ticket.public_id, "panel_id": panel.id })),
        )
        .await;

        Ok((ticket, message))
    }

    /// Appends a message to the ticket. Does not change status.
    pub async fn reply(
        db: &DbConn,
        ticket_id: i64,
        author_user_id: i64,
        author_type: AuthorType,
        body: &str,
        source: TicketSource,
        parent_id: Option<i64>,
    ) -> DomainResult<ticket_message::Model> {
        if body.trim().is_empty() {
            return Err(DomainError::validation("Message must not be empty"));
        }

        let ticket = Self::require(db, ticket_id).await?;
        let message = ticket_message::Model::create(
            db,
            ticket.id,
            author_user_id,
            author_type,
            body,
            source,
            parent_id,
        )
        .await?;

        let now = Utc::now();
        let mut active: ActiveModel = ticket.into();
        active.updated_at = Set(now);
        active.last_message_at = Set(now);
        active.update(db).await?;

        audit_log::Model::record(
            db,
            Some(author_user_id),
            "ticket.reply",
            "ticket",
            ticket_id,
            Some(json!({ "message_id": message.id })),
        )
        .await;

        Ok(message)
    }

    /// Self-assigns the acting staff member.
    ///
    /// A claim-history row is appended unconditionally, even when the ticket
    /// was already claimed by the same member; the history log, not the
    /// current assignment, is the audit source of truth.
    pub async fn claim(
        db: &DbConn,
        ticket_id: i64,
        staff: &super::staff_member::Model,
    ) -> DomainResult<Model> {
        let ticket = Self::require(db, ticket_id).await?;

        let mut active: ActiveModel = ticket.into();
        active.assigned_staff_id = Set(Some(staff.id));
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;

        ticket_claim::Model::record(db, ticket_id, staff.id, ClaimAction::Claim).await?;

        audit_log::Model::record(
            db,
            Some(staff.user_id),
            "ticket.claim",
            "ticket",
            ticket_id,
            Some(json!({ "staff_id": staff.id })),
        )
        .await;

        Ok(updated)
    }

    /// Clears the acting staff member's self-assignment. Appends history
    /// unconditionally, mirroring `claim`.
    pub async fn unclaim(
        db: &DbConn,
        ticket_id: i64,
        staff: &super::staff_member::Model,
    ) -> DomainResult<Model> {
        let ticket = Self::require(db, ticket_id).await?;

        let mut active: ActiveModel = ticket.into();
        active.assigned_staff_id = Set(None);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;

        ticket_claim::Model::record(db, ticket_id, staff.id, ClaimAction::Unclaim).await?;

        audit_log::Model::record(
            db,
            Some(staff.user_id),
            "ticket.unclaim",
            "ticket",
            ticket_id,
            Some(json!({ "staff_id": staff.id })),
        )
        .await;

        Ok(updated)
    }

    /// Managerial assignment to an arbitrary staff member (or nobody),
    /// independent of claim history.
    pub async fn assign(
        db: &DbConn,
        ticket_id: i64,
        target_staff_id: Option<i64>,
        actor_user_id: i64,
    ) -> DomainResult<Model> {
        let ticket = Self::require(db, ticket_id).await?;

        if let Some(staff_id) = target_staff_id {
            let target = super::staff_member::Model::find_by_id(db, staff_id)
                .await?
                .ok_or_else(|| DomainError::not_found("Staff member not found"))?;
            if !target.active {
                return Err(DomainError::validation(
                    "Cannot assign a ticket to an inactive staff member",
                ));
            }
        }

        let mut active: ActiveModel = ticket.into();
        active.assigned_staff_id = Set(target_staff_id);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;

        audit_log::Model::record(
            db,
            Some(actor_user_id),
            "ticket.assign",
            "ticket",
            ticket_id,
            Some(json!({ "assigned_staff_id": target_staff_id })),
        )
        .await;

        Ok(updated)
    }

    async fn apply_status(
        db: &DbConn,
        ticket: Model,
        status: &ticket_status::Model,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let previously_closed_at = ticket.closed_at;

        let mut active: ActiveModel = ticket.into();
        active.status_id = Set(status.id);
        active.updated_at = Set(now);
        // closed_at is set exactly once per closed lifecycle; re-closing an
        // already-closed ticket keeps the original timestamp.
        active.closed_at = Set(if status.is_closed {
            Some(previously_closed_at.unwrap_or(now))
        } else {
            None
        });
        active.update(db).await
    }

    /// Moves the ticket to an arbitrary configured status.
    pub async fn set_status(
        db: &DbConn,
        ticket_id: i64,
        status_id: i64,
        actor_user_id: i64,
    ) -> DomainResult<Model> {
        let ticket = Self::require(db, ticket_id).await?;
        let status = ticket_status::Model::find_by_id(db, status_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ticket status not found"))?;

        let updated = Self::apply_status(db, ticket, &status).await?;

        audit_log::Model::record(
            db,
            Some(actor_user_id),
            "ticket.status",
            "ticket",
            ticket_id,
            Some(json!({ "status_id": status.id, "slug": status.slug })),
        )
        .await;

        Ok(updated)
    }

    /// Moves the ticket to a different active panel and clears the current
    /// assignment, forcing re-triage in the new panel.
    pub async fn escalate(
        db: &DbConn,
        ticket_id: i64,
        target_panel_id: i64,
        actor_user_id: i64,
    ) -> DomainResult<Model> {
        let ticket = Self::require(db, ticket_id).await?;

        if ticket.panel_id == target_panel_id {
            return Err(DomainError::validation(
                "Ticket is already in the target panel",
            ));
        }

        let target = super::ticket_panel::Model::find_by_id(db, target_panel_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Target panel not found"))?;
        if !target.active {
            return Err(DomainError::validation("Target panel is not active"));
        }

        let from_panel_id = ticket.panel_id;
        let mut active: ActiveModel = ticket.into();
        active.panel_id = Set(target.id);
        active.assigned_staff_id = Set(None);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;

        audit_log::Model::record(
            db,
            Some(actor_user_id),
            "ticket.escalate",
            "ticket",
            ticket_id,
            Some(json!({ "from_panel_id": from_panel_id, "to_panel_id": target.id })),
        )
        .await;

        Ok(updated)
    }

    /// Transitions the ticket into the canonical closed status.
    ///
    /// On the first transition into closed, a transcript snapshot is
    /// generated; re-closing creates none. Transcript failures never roll
    /// back the close itself.
    pub async fn close(db: &DbConn, ticket_id: i64, actor_user_id: i64) -> DomainResult<Model> {
        let ticket = Self::require(db, ticket_id).await?;
        let status = ticket_status::Model::find_canonical_closed(db)
            .await?
            .ok_or_else(|| DomainError::conflict("No closed ticket status configured"))?;

        let first_close = ticket.closed_at.is_none();
        let updated = Self::apply_status(db, ticket, &status).await?;

        audit_log::Model::record(
            db,
            Some(actor_user_id),
            "ticket.close",
            "ticket",
            ticket_id,
            Some(json!({ "status_id": status.id, "first_close": first_close })),
        )
        .await;

        if first_close {
            if let Err(e) =
                ticket_transcript::Model::generate(db, ticket_id, TranscriptTrigger::Close).await
            {
                tracing::warn!(
                    error = %e,
                    ticket_id,
                    "transcript generation failed during close"
                );
            }
        }

        Ok(updated)
    }

    /// Clears assignment on every ticket held by the given staff member.
    pub async fn unassign_all_for_staff(db: &DbConn, staff_id: i64) -> Result<(), DbErr> {
        Entity::update_many()
            .col_expr(Column::AssignedStaffId, Expr::value(Option::<i64>::None))
            .filter(Column::AssignedStaffId.eq(staff_id))
            .exec(db)
            .await?;
        Ok(())
    }

    async fn require(db: &DbConn, ticket_id: i64) -> DomainResult<Model> {
        Entity::find_by_id(ticket_id)
            .one(db)
            .await?
            .ok_or_else(|| DomainError::not_found("Ticket not found"))
    }

    pub async fn find_by_id(db: &DbConn, ticket_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(ticket_id).one(db).await
    }

    pub async fn find_by_public_id(db: &DbConn, public_id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::PublicId.eq(public_id))
            .one(db)
            .await
    }

    pub async fn list_for_user(db: &DbConn, user_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::CreatorUserId.eq(user_id))
            .order_by_desc(Column::LastMessageAt)
            .order_by_desc(Column::Id)
            .all(db)
            .await
    }

    /// Staff queue view: tickets in the given panels, optionally filtered by
    /// status, newest activity first.
    pub async fn list_for_panels(
        db: &DbConn,
        panel_ids: &[i64],
        status_id: Option<i64>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Model>, u64), DbErr> {
        if panel_ids.is_empty() {
            return Ok((vec![], 0));
        }

        let mut query = Entity::find().filter(Column::PanelId.is_in(panel_ids.to_vec()));
        if let Some(status_id) = status_id {
            query = query.filter(Column::StatusId.eq(status_id));
        }

        let paginator = query
            .order_by_desc(Column::LastMessageAt)
            .order_by_desc(Column::Id)
            .paginate(db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }
}
