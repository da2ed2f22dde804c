//! The only path by which a booking is persisted or changed.

use std::sync::Arc;
use chrono::NaiveDate;
use tracing::{info, warn};
use crate::domain::models::booking::{
    AccommodationBooking, AccommodationBookingPatch, NewAccommodationBookingParams,
    NewTransportBookingParams, TransportBooking, TransportBookingPatch,
};
use crate::domain::models::listing::{Accommodation, ListingKind, Transport};
use crate::domain::ports::{
    AccommodationBookingRepository, AccommodationRepository,
    TransportBookingRepository, TransportRepository,
};
use crate::domain::services::access_policy::{
    authorize_booking_access, authorize_booking_create, authorize_owner_dashboard,
    authorize_status_change, booking_list_scope, BookingScope, Caller,
};
use crate::domain::services::availability::{quote_seats, quote_stay, validate_seats, validate_stay};
use crate::error::AppError;

pub struct AccommodationBookingRequest {
    pub accommodation_id: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: Option<f64>,
}

pub struct TransportBookingRequest {
    pub transport_id: String,
    pub travel_date: NaiveDate,
    pub seats_booked: i32,
    pub total_price: Option<f64>,
}

pub struct AdmissionController {
    accommodation_repo: Arc<dyn AccommodationRepository>,
    transport_repo: Arc<dyn TransportRepository>,
    accommodation_booking_repo: Arc<dyn AccommodationBookingRepository>,
    transport_booking_repo: Arc<dyn TransportBookingRepository>,
}

impl AdmissionController {
    pub fn new(
        accommodation_repo: Arc<dyn AccommodationRepository>,
        transport_repo: Arc<dyn TransportRepository>,
        accommodation_booking_repo: Arc<dyn AccommodationBookingRepository>,
        transport_booking_repo: Arc<dyn TransportBookingRepository>,
    ) -> Self {
        Self { accommodation_repo, transport_repo, accommodation_booking_repo, transport_booking_repo }
    }

    pub async fn create_accommodation_booking(
        &self,
        caller: &Caller,
        request: AccommodationBookingRequest,
    ) -> Result<AccommodationBooking, AppError> {
        authorize_booking_create(caller)?;
        validate_stay(request.check_in_date, request.check_out_date)?;

        let accommodation = self.find_accommodation(&request.accommodation_id).await?;
        let total_price = request.total_price
            .unwrap_or_else(|| quote_stay(&accommodation, request.check_in_date, request.check_out_date));

        let booking = AccommodationBooking::new(NewAccommodationBookingParams {
            tourist_id: caller.user_id.clone(),
            accommodation_id: accommodation.id,
            check_in_date: request.check_in_date,
            check_out_date: request.check_out_date,
            total_price,
        })?;

        let created = self.accommodation_booking_repo.create_if_available(&booking).await
            .inspect_err(|e| {
                if matches!(e, AppError::Conflict(_)) {
                    warn!(
                        "Accommodation booking rejected for {} [{}, {}): {}",
                        booking.accommodation_id, booking.check_in_date, booking.check_out_date, e
                    );
                }
            })?;

        info!("Accommodation booking admitted: {} for {}", created.id, created.accommodation_id);
        Ok(created)
    }

    pub async fn create_transport_booking(
        &self,
        caller: &Caller,
        request: TransportBookingRequest,
    ) -> Result<TransportBooking, AppError> {
        authorize_booking_create(caller)?;
        validate_seats(request.seats_booked)?;

        let transport = self.find_transport(&request.transport_id).await?;
        let total_price = request.total_price
            .unwrap_or_else(|| quote_seats(&transport, request.seats_booked));

        let booking = TransportBooking::new(NewTransportBookingParams {
            tourist_id: caller.user_id.clone(),
            transport_id: transport.id,
            travel_date: request.travel_date,
            seats_booked: request.seats_booked,
            total_price,
        })?;

        let created = self.transport_booking_repo.create_if_available(&booking).await
            .inspect_err(|e| {
                if matches!(e, AppError::Conflict(_)) {
                    warn!(
                        "Transport booking rejected for {} on {} ({} seats): {}",
                        booking.transport_id, booking.travel_date, booking.seats_booked, e
                    );
                }
            })?;

        info!("Transport booking admitted: {} for {}", created.id, created.transport_id);
        Ok(created)
    }

    pub async fn get_accommodation_booking(&self, caller: &Caller, id: &str) -> Result<AccommodationBooking, AppError> {
        let (booking, _) = self.load_accommodation_booking(caller, id).await?;
        Ok(booking)
    }

    pub async fn get_transport_booking(&self, caller: &Caller, id: &str) -> Result<TransportBooking, AppError> {
        let (booking, _) = self.load_transport_booking(caller, id).await?;
        Ok(booking)
    }

    pub async fn list_accommodation_bookings(&self, caller: &Caller) -> Result<Vec<AccommodationBooking>, AppError> {
        match booking_list_scope(caller, ListingKind::Accommodation)? {
            BookingScope::Tourist(id) => self.accommodation_booking_repo.list_by_tourist(&id).await,
            BookingScope::ListingOwner(id) => self.accommodation_booking_repo.list_by_host(&id).await,
        }
    }

    pub async fn list_transport_bookings(&self, caller: &Caller) -> Result<Vec<TransportBooking>, AppError> {
        match booking_list_scope(caller, ListingKind::Transport)? {
            BookingScope::Tourist(id) => self.transport_booking_repo.list_by_tourist(&id).await,
            BookingScope::ListingOwner(id) => self.transport_booking_repo.list_by_driver(&id).await,
        }
    }

    pub async fn list_host_bookings(&self, caller: &Caller) -> Result<Vec<AccommodationBooking>, AppError> {
        authorize_owner_dashboard(caller, ListingKind::Accommodation)?;
        self.accommodation_booking_repo.list_by_host(&caller.user_id).await
    }

    pub async fn list_driver_bookings(&self, caller: &Caller) -> Result<Vec<TransportBooking>, AppError> {
        authorize_owner_dashboard(caller, ListingKind::Transport)?;
        self.transport_booking_repo.list_by_driver(&caller.user_id).await
    }

    pub async fn list_bookings_for_accommodation(
        &self,
        caller: &Caller,
        accommodation_id: &str,
    ) -> Result<Vec<AccommodationBooking>, AppError> {
        authorize_owner_dashboard(caller, ListingKind::Accommodation)?;
        let accommodation = self.find_accommodation(accommodation_id).await?;
        if accommodation.host_id != caller.user_id {
            return Err(AppError::forbidden("Access denied. You don't own this accommodation."));
        }
        self.accommodation_booking_repo.list_by_accommodation(&accommodation.id).await
    }

    pub async fn list_bookings_for_transport(
        &self,
        caller: &Caller,
        transport_id: &str,
    ) -> Result<Vec<TransportBooking>, AppError> {
        authorize_owner_dashboard(caller, ListingKind::Transport)?;
        let transport = self.find_transport(transport_id).await?;
        if transport.driver_id != caller.user_id {
            return Err(AppError::forbidden("Access denied. You don't own this transport."));
        }
        self.transport_booking_repo.list_by_transport(&transport.id).await
    }

    /// Applies an allow-listed patch and re-admits the result. The patch is
    /// applied to the row read under the listing lock, and the stored
    /// booking is only replaced if the patched version passes the same
    /// availability check as a new booking, with itself excluded.
    pub async fn update_accommodation_booking(
        &self,
        caller: &Caller,
        id: &str,
        patch: AccommodationBookingPatch,
    ) -> Result<AccommodationBooking, AppError> {
        let (booking, accommodation) = self.load_accommodation_booking(caller, id).await?;
        if let Some(next) = patch.status {
            authorize_status_change(caller, &accommodation.host_id, booking.status()?, next)?;
        }

        let updated = self.accommodation_booking_repo.update_if_available(&booking.id, patch).await
            .inspect_err(|e| {
                if matches!(e, AppError::Conflict(_)) {
                    warn!("Accommodation booking update rejected for {}: {}", booking.id, e);
                }
            })?;
        info!("Accommodation booking updated: {}", updated.id);
        Ok(updated)
    }

    pub async fn update_transport_booking(
        &self,
        caller: &Caller,
        id: &str,
        patch: TransportBookingPatch,
    ) -> Result<TransportBooking, AppError> {
        let (booking, transport) = self.load_transport_booking(caller, id).await?;
        if let Some(next) = patch.status {
            authorize_status_change(caller, &transport.driver_id, booking.status()?, next)?;
        }

        let updated = self.transport_booking_repo.update_if_available(&booking.id, patch).await
            .inspect_err(|e| {
                if matches!(e, AppError::Conflict(_)) {
                    warn!("Transport booking update rejected for {}: {}", booking.id, e);
                }
            })?;
        info!("Transport booking updated: {}", updated.id);
        Ok(updated)
    }

    pub async fn cancel_accommodation_booking(&self, caller: &Caller, id: &str) -> Result<AccommodationBooking, AppError> {
        let (booking, _) = self.load_accommodation_booking(caller, id).await?;
        if !booking.is_active() {
            return Ok(booking);
        }
        let cancelled = self.accommodation_booking_repo.cancel(&booking.id).await?;
        info!("Accommodation booking cancelled: {}", cancelled.id);
        Ok(cancelled)
    }

    pub async fn cancel_transport_booking(&self, caller: &Caller, id: &str) -> Result<TransportBooking, AppError> {
        let (booking, _) = self.load_transport_booking(caller, id).await?;
        if !booking.is_active() {
            return Ok(booking);
        }
        let cancelled = self.transport_booking_repo.cancel(&booking.id).await?;
        info!("Transport booking cancelled: {}", cancelled.id);
        Ok(cancelled)
    }

    pub async fn delete_accommodation_booking(&self, caller: &Caller, id: &str) -> Result<(), AppError> {
        let (booking, _) = self.load_accommodation_booking(caller, id).await?;
        self.accommodation_booking_repo.delete(&booking.id).await?;
        info!("Accommodation booking deleted: {}", booking.id);
        Ok(())
    }

    pub async fn delete_transport_booking(&self, caller: &Caller, id: &str) -> Result<(), AppError> {
        let (booking, _) = self.load_transport_booking(caller, id).await?;
        self.transport_booking_repo.delete(&booking.id).await?;
        info!("Transport booking deleted: {}", booking.id);
        Ok(())
    }

    async fn find_accommodation(&self, id: &str) -> Result<Accommodation, AppError> {
        self.accommodation_repo.find_by_id(id).await?
            .ok_or(AppError::NotFound("Accommodation not found".into()))
    }

    async fn find_transport(&self, id: &str) -> Result<Transport, AppError> {
        self.transport_repo.find_by_id(id).await?
            .ok_or(AppError::NotFound("Transport not found".into()))
    }

    async fn load_accommodation_booking(
        &self,
        caller: &Caller,
        id: &str,
    ) -> Result<(AccommodationBooking, Accommodation), AppError> {
        let booking = self.accommodation_booking_repo.find_by_id(id).await?
            .ok_or(AppError::NotFound("Accommodation booking not found".into()))?;
        let accommodation = self.find_accommodation(&booking.accommodation_id).await?;
        authorize_booking_access(caller, &booking.tourist_id, &accommodation.host_id)?;
        Ok((booking, accommodation))
    }

    async fn load_transport_booking(
        &self,
        caller: &Caller,
        id: &str,
    ) -> Result<(TransportBooking, Transport), AppError> {
        let booking = self.transport_booking_repo.find_by_id(id).await?
            .ok_or(AppError::NotFound("Transport booking not found".into()))?;
        let transport = self.find_transport(&booking.transport_id).await?;
        authorize_booking_access(caller, &booking.tourist_id, &transport.driver_id)?;
        Ok((booking, transport))
    }
}
