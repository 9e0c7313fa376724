//! Guest record model
//!
//! A guest record is a flat set of independently mergeable fields keyed by
//! an immutable invitation id. Partial updates arrive as [`GuestPatch`]
//! values whose absent fields leave the stored value untouched, so applying
//! the same patch twice yields the same record as applying it once.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a guest invitation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvitationId(pub String);

impl InvitationId {
    /// Create a new invitation ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvitationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InvitationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InvitationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// RSVP classification derived from a record's invitation flags.
///
/// This is the single derivation rule used everywhere a guest is counted:
/// a guest only counts as accepted or declined once the invitation was
/// delivered and answered; everything before that is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsvpStatus {
    /// Invitation not delivered yet, or delivered but unanswered
    Pending,
    /// Answered with a headcount of at least one
    Accepted,
    /// Answered with a headcount of zero
    Declined,
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RsvpStatus::Pending => write!(f, "pending"),
            RsvpStatus::Accepted => write!(f, "accepted"),
            RsvpStatus::Declined => write!(f, "declined"),
        }
    }
}

/// A single guest record, keyed by its invitation ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestRecord {
    /// Immutable unique key
    pub invitation_id: InvitationId,

    /// Guest display name
    pub name: String,

    /// Contact phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// An invitation exists for this guest
    #[serde(default)]
    pub invited: bool,

    /// The invitation reached the guest
    #[serde(default)]
    pub invitation_delivered: bool,

    /// The guest has answered the invitation
    #[serde(default)]
    pub invitation_response: bool,

    /// Confirmed headcount (0 = coming alone is 1; 0 with a response = declined)
    #[serde(default)]
    pub participation: u32,

    /// Assigned table, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_number: Option<u32>,

    /// Assigned seat within the table, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_position: Option<u32>,
}

impl GuestRecord {
    /// Create a minimal record with the given key and name
    pub fn new(invitation_id: impl Into<InvitationId>, name: impl Into<String>) -> Self {
        Self {
            invitation_id: invitation_id.into(),
            name: name.into(),
            phone: None,
            invited: false,
            invitation_delivered: false,
            invitation_response: false,
            participation: 0,
            table_number: None,
            table_position: None,
        }
    }

    /// Derive the canonical RSVP classification for this record.
    pub fn rsvp_status(&self) -> RsvpStatus {
        if self.invited && self.invitation_delivered && self.invitation_response {
            if self.participation > 0 {
                RsvpStatus::Accepted
            } else {
                RsvpStatus::Declined
            }
        } else {
            RsvpStatus::Pending
        }
    }

    /// Merge a partial update into this record.
    ///
    /// Only the fields present in the patch change; absent fields keep their
    /// prior values. The patch's invitation id is not copied (the key is
    /// immutable).
    pub fn apply(&mut self, patch: &GuestPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(invited) = patch.invited {
            self.invited = invited;
        }
        if let Some(delivered) = patch.invitation_delivered {
            self.invitation_delivered = delivered;
        }
        if let Some(response) = patch.invitation_response {
            self.invitation_response = response;
        }
        if let Some(participation) = patch.participation {
            self.participation = participation;
        }
        if let Some(table) = patch.table_number {
            self.table_number = Some(table);
        }
        if let Some(position) = patch.table_position {
            self.table_position = Some(position);
        }
    }

    /// Copy the fields named by `patch` from `prior` back into this record.
    ///
    /// Used to roll back an optimistic update: only the fields the patch
    /// touched are restored, so concurrent changes to other fields survive.
    pub fn restore(&mut self, patch: &GuestPatch, prior: &GuestRecord) {
        if patch.name.is_some() {
            self.name = prior.name.clone();
        }
        if patch.phone.is_some() {
            self.phone = prior.phone.clone();
        }
        if patch.invited.is_some() {
            self.invited = prior.invited;
        }
        if patch.invitation_delivered.is_some() {
            self.invitation_delivered = prior.invitation_delivered;
        }
        if patch.invitation_response.is_some() {
            self.invitation_response = prior.invitation_response;
        }
        if patch.participation.is_some() {
            self.participation = prior.participation;
        }
        if patch.table_number.is_some() {
            self.table_number = prior.table_number;
        }
        if patch.table_position.is_some() {
            self.table_position = prior.table_position;
        }
    }
}

/// A partial update to a guest record.
///
/// Absent fields are omitted on the wire and leave the stored value
/// untouched when merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestPatch {
    /// Key of the record this patch targets
    pub invitation_id: InvitationId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invited: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitation_delivered: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitation_response: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participation: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_number: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_position: Option<u32>,
}

impl GuestPatch {
    /// Create an empty patch targeting the given key
    pub fn new(invitation_id: impl Into<InvitationId>) -> Self {
        Self {
            invitation_id: invitation_id.into(),
            name: None,
            phone: None,
            invited: None,
            invitation_delivered: None,
            invitation_response: None,
            participation: None,
            table_number: None,
            table_position: None,
        }
    }

    /// Set the table assignment
    pub fn with_table(mut self, table: u32) -> Self {
        self.table_number = Some(table);
        self
    }

    /// Set the seat within the table
    pub fn with_position(mut self, position: u32) -> Self {
        self.table_position = Some(position);
        self
    }

    /// Set the confirmed headcount
    pub fn with_participation(mut self, participation: u32) -> Self {
        self.participation = Some(participation);
        self
    }

    /// True if no field is present
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.invited.is_none()
            && self.invitation_delivered.is_none()
            && self.invitation_response.is_none()
            && self.participation.is_none()
            && self.table_number.is_none()
            && self.table_position.is_none()
    }

    /// Overlay `later` on top of this patch, field by field.
    ///
    /// Fields present in `later` win; fields only present in `self` survive.
    /// Used to coalesce rapid submits into one outbound request.
    pub fn merge(&mut self, later: &GuestPatch) {
        if later.name.is_some() {
            self.name = later.name.clone();
        }
        if later.phone.is_some() {
            self.phone = later.phone.clone();
        }
        if later.invited.is_some() {
            self.invited = later.invited;
        }
        if later.invitation_delivered.is_some() {
            self.invitation_delivered = later.invitation_delivered;
        }
        if later.invitation_response.is_some() {
            self.invitation_response = later.invitation_response;
        }
        if later.participation.is_some() {
            self.participation = later.participation;
        }
        if later.table_number.is_some() {
            self.table_number = later.table_number;
        }
        if later.table_position.is_some() {
            self.table_position = later.table_position;
        }
    }
}

/// Aggregate counters derived from a collection of records.
///
/// Every counter uses [`GuestRecord::rsvp_status`], so the numbers cannot
/// disagree with each other the way independently derived counts can.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestStats {
    /// Total records
    pub total: usize,
    /// Invitations marked delivered
    pub delivered: usize,
    /// Invitations not yet delivered
    pub undelivered: usize,
    /// Records with a recorded response
    pub responded: usize,
    /// Records classified accepted
    pub accepted: usize,
    /// Records classified declined
    pub declined: usize,
    /// Confirmed headcount across accepted records
    pub confirmed_headcount: u32,
}

impl GuestStats {
    /// Derive stats from an iterator of records
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a GuestRecord>) -> Self {
        let mut stats = GuestStats::default();
        for record in records {
            stats.total += 1;
            if record.invitation_delivered {
                stats.delivered += 1;
            } else {
                stats.undelivered += 1;
            }
            if record.invitation_response {
                stats.responded += 1;
            }
            match record.rsvp_status() {
                RsvpStatus::Accepted => {
                    stats.accepted += 1;
                    stats.confirmed_headcount += record.participation;
                }
                RsvpStatus::Declined => stats.declined += 1,
                RsvpStatus::Pending => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> GuestRecord {
        GuestRecord::new(id, "Ana")
    }

    #[test]
    fn test_apply_only_overwrites_present_fields() {
        let mut guest = record("inv-5");
        guest.table_number = None;

        let patch = GuestPatch::new("inv-5").with_table(12);
        guest.apply(&patch);

        assert_eq!(guest.name, "Ana");
        assert_eq!(guest.table_number, Some(12));
        assert_eq!(guest.table_position, None);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut once = record("inv-1");
        let mut twice = record("inv-1");
        let patch = GuestPatch::new("inv-1").with_table(3).with_participation(2);

        once.apply(&patch);
        twice.apply(&patch);
        twice.apply(&patch);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_restore_reverts_only_patched_fields() {
        let prior = record("inv-2");
        let mut guest = prior.clone();

        let patch = GuestPatch::new("inv-2").with_table(7);
        guest.apply(&patch);
        guest.name = "Renamed elsewhere".to_string();

        guest.restore(&patch, &prior);

        // table reverted to unassigned, concurrent rename untouched
        assert_eq!(guest.table_number, None);
        assert_eq!(guest.name, "Renamed elsewhere");
    }

    #[test]
    fn test_patch_merge_latest_value_wins() {
        let mut first = GuestPatch::new("inv-3").with_table(5);
        let second = GuestPatch::new("inv-3").with_table(9).with_position(2);

        first.merge(&second);

        assert_eq!(first.table_number, Some(9));
        assert_eq!(first.table_position, Some(2));
    }

    #[test]
    fn test_rsvp_requires_delivery_and_response() {
        let mut guest = record("inv-4");
        guest.invited = true;
        guest.participation = 3;
        assert_eq!(guest.rsvp_status(), RsvpStatus::Pending);

        guest.invitation_delivered = true;
        assert_eq!(guest.rsvp_status(), RsvpStatus::Pending);

        guest.invitation_response = true;
        assert_eq!(guest.rsvp_status(), RsvpStatus::Accepted);

        guest.participation = 0;
        assert_eq!(guest.rsvp_status(), RsvpStatus::Declined);
    }

    #[test]
    fn test_stats_headcount_sums_accepted_only() {
        let mut accepted = record("inv-a");
        accepted.invited = true;
        accepted.invitation_delivered = true;
        accepted.invitation_response = true;
        accepted.participation = 4;

        let mut pending = record("inv-b");
        pending.invited = true;
        pending.participation = 2;

        let stats = GuestStats::from_records([&accepted, &pending]);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.confirmed_headcount, 4);
        assert_eq!(stats.undelivered, 1);
    }

    #[test]
    fn test_patch_absent_fields_skipped_on_wire() {
        let patch = GuestPatch::new("inv-6").with_table(12);
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"invitationId":"inv-6","tableNumber":12}"#);
    }
}
