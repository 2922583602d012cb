//! Prepaid balance ledger entities

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Minutes after creation during which a top-up may be voided.
pub const VOID_WINDOW_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopupKind {
    Topup,
    Void,
}

impl TopupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topup => "TOPUP",
            Self::Void => "VOID",
        }
    }
}

/// Fresh reference number for a ledger row, e.g. `TOP-3F2A9C0B1D4E`.
pub fn new_reference_number(kind: TopupKind) -> String {
    let prefix = match kind {
        TopupKind::Topup => "TOP",
        TopupKind::Void => "VOD",
    };
    let token = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, token[..12].to_uppercase())
}

/// One balance-changing event. `id` is the reference id used to void it.
#[derive(Debug, Clone, Serialize)]
pub struct TopupLogEntry {
    pub id: i32,
    pub cpo_account_id: i32,
    pub kind: TopupKind,
    /// Always positive; `kind` gives the direction.
    pub amount: i64,
    pub reference_number: String,
    /// Id of the VOID entry that reversed this top-up.
    pub void_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl TopupLogEntry {
    /// End of the void window (exclusive).
    pub fn void_deadline(&self) -> DateTime<Utc> {
        self.created_at + Duration::minutes(VOID_WINDOW_MINUTES)
    }

    pub fn is_voided(&self) -> bool {
        self.void_id.is_some()
    }

    /// A top-up is voidable while younger than the window and not yet voided.
    /// Once this turns false it never becomes true again.
    pub fn is_voidable_at(&self, now: DateTime<Utc>) -> bool {
        self.kind == TopupKind::Topup && !self.is_voided() && now < self.void_deadline()
    }
}

/// Store result for a top-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopupReceipt {
    pub status: String,
    pub cpo_account_id: i32,
    pub new_balance: i64,
    pub reference_number: String,
}

/// Store result for a void.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoidReceipt {
    pub status: String,
    pub cpo_account_id: i32,
    pub current_balance: i64,
    pub reference_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry_at(created_at: DateTime<Utc>) -> TopupLogEntry {
        TopupLogEntry {
            id: 1,
            cpo_account_id: 42,
            kind: TopupKind::Topup,
            amount: 100,
            reference_number: "REF-1".into(),
            void_id: None,
            created_at,
        }
    }

    #[test]
    fn voidable_inside_the_window() {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let e = entry_at(t);
        assert!(e.is_voidable_at(t));
        assert!(e.is_voidable_at(t + Duration::minutes(59) + Duration::seconds(59)));
    }

    #[test]
    fn settled_at_the_deadline() {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let e = entry_at(t);
        assert!(!e.is_voidable_at(t + Duration::minutes(60)));
        assert!(!e.is_voidable_at(t + Duration::hours(5)));
    }

    #[test]
    fn voided_entries_are_settled() {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let mut e = entry_at(t);
        e.void_id = Some(7);
        assert!(!e.is_voidable_at(t));
    }

    #[test]
    fn reference_numbers_are_prefixed_and_unique() {
        let a = new_reference_number(TopupKind::Topup);
        let b = new_reference_number(TopupKind::Topup);
        assert!(a.starts_with("TOP-"));
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
        assert!(new_reference_number(TopupKind::Void).starts_with("VOD-"));
    }

    #[test]
    fn void_rows_are_never_voidable() {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let mut e = entry_at(t);
        e.kind = TopupKind::Void;
        assert!(!e.is_voidable_at(t));
    }
}
