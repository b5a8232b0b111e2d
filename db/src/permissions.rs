//! Capability and rank resolution for staff actors.
//!
//! Roles store their permission set as JSON text: either the wildcard `"*"`
//! (legacy spelling `"all"` is accepted on parse) or an array of capability
//! strings. Unknown strings are ignored rather than rejected, so removing a
//! capability from the enum never locks a role out of parsing.
//!
//! Rank is a three-tier total order instead of sentinel arithmetic: the admin
//! role outranks everything, ranked roles order by `sort_order` ascending
//! (lower = more senior), and roles with no `sort_order` are outranked by all
//! ranked roles.

use std::cmp::Ordering;
use std::collections::HashSet;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{DomainError, DomainResult};
use crate::models::{role, staff_member};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Capability {
    #[strum(serialize = "tickets.view")]
    ViewTickets,
    #[strum(serialize = "tickets.reply")]
    ReplyTickets,
    #[strum(serialize = "tickets.claim")]
    ClaimTickets,
    #[strum(serialize = "tickets.assign")]
    AssignTickets,
    #[strum(serialize = "tickets.status")]
    UpdateTicketStatus,
    #[strum(serialize = "tickets.escalate")]
    EscalateTickets,
    #[strum(serialize = "tickets.close")]
    CloseTickets,
    #[strum(serialize = "tickets.transcripts")]
    GenerateTranscripts,
    #[strum(serialize = "panels.manage")]
    ManagePanels,
    #[strum(serialize = "statuses.manage")]
    ManageStatuses,
    #[strum(serialize = "roles.manage")]
    ManageRoles,
    #[strum(serialize = "staff.manage")]
    ManageStaff,
    #[strum(serialize = "pay.manage")]
    ManagePay,
    #[strum(serialize = "audit.view")]
    ViewAuditLog,
}

/// A role's resolved permission set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilitySet {
    /// Wildcard: every capability, current and future.
    All,
    Set(HashSet<Capability>),
}

impl CapabilitySet {
    pub fn empty() -> Self {
        CapabilitySet::Set(HashSet::new())
    }

    pub fn from_caps(caps: impl IntoIterator<Item = Capability>) -> Self {
        CapabilitySet::Set(caps.into_iter().collect())
    }

    /// Parses the stored JSON text form. Fails open to an empty set on
    /// malformed input; unknown capability strings are ignored.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == "*" || trimmed.eq_ignore_ascii_case("all") {
            return CapabilitySet::All;
        }
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::String(s)) if s == "*" || s.eq_ignore_ascii_case("all") => {
                CapabilitySet::All
            }
            Ok(serde_json::Value::Array(items)) => {
                let caps = items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .filter_map(|s| s.parse::<Capability>().ok())
                    .collect();
                CapabilitySet::Set(caps)
            }
            _ => CapabilitySet::empty(),
        }
    }

    /// Serializes back to the stored JSON text form.
    pub fn to_json(&self) -> String {
        match self {
            CapabilitySet::All => "\"*\"".to_string(),
            CapabilitySet::Set(caps) => {
                let mut names: Vec<String> = caps.iter().map(|c| c.to_string()).collect();
                names.sort();
                serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
            }
        }
    }

    pub fn contains(&self, cap: Capability) -> bool {
        match self {
            CapabilitySet::All => true,
            CapabilitySet::Set(caps) => caps.contains(&cap),
        }
    }

    /// True iff every capability in `other` is also held by `self`.
    pub fn is_superset_of(&self, other: &CapabilitySet) -> bool {
        match (self, other) {
            (CapabilitySet::All, _) => true,
            (CapabilitySet::Set(_), CapabilitySet::All) => false,
            (CapabilitySet::Set(mine), CapabilitySet::Set(theirs)) => {
                theirs.iter().all(|c| mine.contains(c))
            }
        }
    }

    /// Capabilities in `other` that `self` lacks, for denial messages.
    pub fn missing_from(&self, other: &CapabilitySet) -> Vec<Capability> {
        match (self, other) {
            (CapabilitySet::All, _) => vec![],
            (CapabilitySet::Set(mine), CapabilitySet::Set(theirs)) => theirs
                .iter()
                .filter(|c| !mine.contains(*c))
                .copied()
                .collect(),
            (CapabilitySet::Set(_), CapabilitySet::All) => Capability::iter()
                .filter(|c| !self.contains(*c))
                .collect(),
        }
    }
}

/// Seniority of a role in the hierarchy. Total order; "outranks" means
/// strictly more senior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Admin,
    Ranked(i32),
    Unranked,
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        use Rank::*;
        match (self, other) {
            (Admin, Admin) => Ordering::Equal,
            (Admin, _) => Ordering::Less,
            (_, Admin) => Ordering::Greater,
            (Ranked(a), Ranked(b)) => a.cmp(b),
            (Ranked(_), Unranked) => Ordering::Less,
            (Unranked, Ranked(_)) => Ordering::Greater,
            (Unranked, Unranked) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Rank {
    /// Strictly more senior than `other`.
    pub fn outranks(self, other: Rank) -> bool {
        self < other
    }
}

/// Resolves a role's rank.
pub fn rank_of(role: &role::Model) -> Rank {
    if role.is_admin {
        Rank::Admin
    } else {
        match role.sort_order {
            Some(n) => Rank::Ranked(n),
            None => Rank::Unranked,
        }
    }
}

/// Whether the staff member currently holds `cap`.
///
/// Inactive staff hold nothing; the admin role holds everything.
pub fn has_capability(staff: &staff_member::Model, role: &role::Model, cap: Capability) -> bool {
    if !staff.active {
        return false;
    }
    if role.is_admin {
        return true;
    }
    CapabilitySet::parse(&role.permissions).contains(cap)
}

/// Hierarchical action rule for role edit/delete and staff management.
///
/// A non-admin actor may act on a target role iff the actor strictly
/// outranks it, and the target is not the admin role.
pub fn ensure_can_act_on_role(
    actor_role: &role::Model,
    target_role: &role::Model,
) -> DomainResult<()> {
    if actor_role.is_admin {
        return Ok(());
    }
    if target_role.is_admin {
        return Err(DomainError::forbidden(
            "The admin role cannot be managed by non-admin staff",
        ));
    }
    let actor = rank_of(actor_role);
    let target = rank_of(target_role);
    if actor.outranks(target) {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!(
            "Role '{}' does not outrank role '{}'",
            actor_role.name, target_role.name
        )))
    }
}

/// Privilege non-escalation: a non-admin actor may only grant permissions it
/// already holds.
pub fn ensure_grant_allowed(
    actor_role: &role::Model,
    granted: &CapabilitySet,
) -> DomainResult<()> {
    if actor_role.is_admin {
        return Ok(());
    }
    let held = CapabilitySet::parse(&actor_role.permissions);
    if held.is_superset_of(granted) {
        Ok(())
    } else {
        let missing: Vec<String> = held
            .missing_from(granted)
            .iter()
            .map(|c| c.to_string())
            .collect();
        Err(DomainError::forbidden(format!(
            "Cannot grant permissions you do not hold: {}",
            missing.join(", ")
        )))
    }
}
