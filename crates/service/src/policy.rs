//! Authorization policy: pure decision functions over the caller identity.
//!
//! Catalog mutations are admin-only; reservation visibility and mutation are
//! owner-or-admin, with a 24-hour cutoff gating non-admin edits and cancels.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use models::user::Role;

use crate::errors::ServiceError;

/// Authenticated actor as resolved by the identity collaborator.
#[derive(Copy, Clone, Debug)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Visibility scope for reservation listings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    All,
    Owner(Uuid),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResvAction {
    Edit,
    Cancel,
}

/// Hours a non-admin must leave between "now" and the reservation date to
/// still be allowed to edit or cancel it.
pub const EDIT_WINDOW_HOURS: i64 = 24;

pub fn require_admin(caller: &Caller) -> Result<(), ServiceError> {
    if caller.is_admin() {
        return Ok(());
    }
    let role = match caller.role {
        Role::Admin => "admin",
        Role::User => "user",
    };
    Err(ServiceError::Forbidden(format!(
        "User role {} is not authorized to access this route",
        role
    )))
}

/// Admins see everything; everyone else is hard-scoped to their own rows.
pub fn reservation_scope(caller: &Caller) -> Scope {
    if caller.is_admin() {
        Scope::All
    } else {
        Scope::Owner(caller.id)
    }
}

pub fn can_view_reservation(caller: &Caller, owner: Uuid) -> bool {
    caller.is_admin() || caller.id == owner
}

/// Gate a reservation edit or cancel.
///
/// Admins pass unconditionally. A non-admin must own the record, and the
/// current time must not be past `resv_date - 24h`; the two failures carry
/// distinct errors (403 ownership vs 400 window).
pub fn authorize_reservation_change(
    caller: &Caller,
    owner: Uuid,
    resv_date: DateTime<Utc>,
    now: DateTime<Utc>,
    action: ResvAction,
) -> Result<(), ServiceError> {
    if caller.is_admin() {
        return Ok(());
    }
    if caller.id != owner {
        let verb = match action {
            ResvAction::Edit => "update",
            ResvAction::Cancel => "cancel",
        };
        return Err(ServiceError::Forbidden(format!(
            "Not authorized to {} this reservation",
            verb
        )));
    }
    let cutoff = resv_date - Duration::hours(EDIT_WINDOW_HOURS);
    if now > cutoff {
        let verb = match action {
            ResvAction::Edit => "edit",
            ResvAction::Cancel => "cancel",
        };
        return Err(ServiceError::Validation(format!(
            "You can only {} reservations at least 1 day before the reservation date",
            verb
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Caller {
        Caller { id: Uuid::new_v4(), role: Role::Admin }
    }

    fn user() -> Caller {
        Caller { id: Uuid::new_v4(), role: Role::User }
    }

    #[test]
    fn scope_follows_role() {
        let a = admin();
        let u = user();
        assert_eq!(reservation_scope(&a), Scope::All);
        assert_eq!(reservation_scope(&u), Scope::Owner(u.id));
    }

    #[test]
    fn catalog_mutations_are_admin_only() {
        assert!(require_admin(&admin()).is_ok());
        assert!(matches!(require_admin(&user()), Err(ServiceError::Forbidden(_))));
    }

    #[test]
    fn view_is_owner_or_admin() {
        let u = user();
        let other = Uuid::new_v4();
        assert!(can_view_reservation(&u, u.id));
        assert!(!can_view_reservation(&u, other));
        assert!(can_view_reservation(&admin(), other));
    }

    #[test]
    fn non_owner_change_is_forbidden() {
        let u = user();
        let now = Utc::now();
        let date = now + Duration::days(5);
        let err = authorize_reservation_change(&u, Uuid::new_v4(), date, now, ResvAction::Edit)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test]
    fn owner_inside_window_is_rejected_with_window_message() {
        let u = user();
        let now = Utc::now();
        let date = now + Duration::hours(12);
        let err = authorize_reservation_change(&u, u.id, date, now, ResvAction::Cancel)
            .unwrap_err();
        match err {
            ServiceError::Validation(msg) => assert!(msg.contains("at least 1 day before")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn exactly_24h_before_is_still_allowed() {
        let u = user();
        let now = Utc::now();
        let date = now + Duration::hours(24);
        assert!(
            authorize_reservation_change(&u, u.id, date, now, ResvAction::Edit).is_ok()
        );
    }

    #[test]
    fn admin_bypasses_window_and_ownership() {
        let a = admin();
        let now = Utc::now();
        let date = now + Duration::hours(1);
        assert!(authorize_reservation_change(&a, Uuid::new_v4(), date, now, ResvAction::Cancel)
            .is_ok());
    }
}
