//! Role and ownership rules for listings and bookings.
//!
//! Every check returns `AppError::Forbidden` on failure so a caller can
//! always tell "forbidden" apart from "not found".

use crate::domain::models::booking::BookingStatus;
use crate::domain::models::listing::ListingKind;
use crate::domain::models::user::Role;
use crate::error::AppError;

/// Authenticated identity taken from the access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self { user_id: user_id.into(), role }
    }
}

/// Which bookings a list request may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingScope {
    Tourist(String),
    ListingOwner(String),
}

pub fn owner_role(kind: ListingKind) -> Role {
    match kind {
        ListingKind::Accommodation => Role::Host,
        ListingKind::Transport => Role::Driver,
    }
}

pub fn authorize_listing_create(caller: &Caller, kind: ListingKind) -> Result<(), AppError> {
    let required = owner_role(kind);
    if caller.role != required {
        return Err(AppError::forbidden(format!("Only {}s can create {}s", required, kind.label())));
    }
    Ok(())
}

pub fn authorize_listing_mutation(caller: &Caller, kind: ListingKind, owner_id: &str) -> Result<(), AppError> {
    authorize_listing_create(caller, kind)?;
    if caller.user_id != owner_id {
        return Err(AppError::forbidden(format!("You can only modify your own {}s", kind.label())));
    }
    Ok(())
}

pub fn authorize_booking_create(caller: &Caller) -> Result<(), AppError> {
    if caller.role != Role::Tourist {
        return Err(AppError::forbidden("Only tourists can create bookings"));
    }
    Ok(())
}

/// Single read, update, cancel and delete: the booking's tourist or the owner of the booked listing.
pub fn authorize_booking_access(caller: &Caller, tourist_id: &str, listing_owner_id: &str) -> Result<(), AppError> {
    if caller.user_id == tourist_id || caller.user_id == listing_owner_id {
        return Ok(());
    }
    Err(AppError::forbidden("Access denied"))
}

/// Confirming a booking is the listing owner's decision; either party may cancel.
pub fn authorize_status_change(
    caller: &Caller,
    listing_owner_id: &str,
    current: BookingStatus,
    next: BookingStatus,
) -> Result<(), AppError> {
    if next == BookingStatus::Confirmed && current != BookingStatus::Confirmed && caller.user_id != listing_owner_id {
        return Err(AppError::forbidden("Only the listing owner can confirm a booking"));
    }
    Ok(())
}

pub fn booking_list_scope(caller: &Caller, kind: ListingKind) -> Result<BookingScope, AppError> {
    if caller.role == Role::Tourist {
        return Ok(BookingScope::Tourist(caller.user_id.clone()));
    }
    if caller.role == owner_role(kind) {
        return Ok(BookingScope::ListingOwner(caller.user_id.clone()));
    }
    Err(AppError::forbidden(format!("A {} cannot list {} bookings", caller.role, kind.label())))
}

/// Host and driver dashboards are restricted to the role owning that listing kind.
pub fn authorize_owner_dashboard(caller: &Caller, kind: ListingKind) -> Result<(), AppError> {
    if caller.role == owner_role(kind) {
        return Ok(());
    }
    match kind {
        ListingKind::Accommodation => Err(AppError::forbidden("Access denied. Host access only.")),
        ListingKind::Transport => Err(AppError::forbidden("Access denied. Driver access only.")),
    }
}
