use crate::domain::{
    models::{
        booking::{TransportBooking, TransportBookingPatch},
        listing::Transport,
    },
    ports::TransportBookingRepository,
    services::availability::{ensure_transport_open, seats_fit},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Executor, PgConnection, PgPool, Postgres};

pub struct PostgresTransportBookingRepo {
    pool: PgPool,
}

impl PostgresTransportBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row-locks the transport until the surrounding transaction ends.
async fn lock_transport(conn: &mut PgConnection, id: &str) -> Result<Transport, AppError> {
    sqlx::query_as::<_, Transport>("SELECT * FROM transports WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?
        .ok_or(AppError::NotFound("Transport not found".into()))
}

/// Transport first, then the booking row, as admission does.
async fn claim_booking(conn: &mut PgConnection, id: &str) -> Result<(TransportBooking, Transport), AppError> {
    let transport_id = sqlx::query_scalar::<_, String>(
        "SELECT transport_id FROM transport_bookings WHERE id = $1"
    )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?
        .ok_or(AppError::NotFound("Transport booking not found".into()))?;

    let transport = lock_transport(&mut *conn, &transport_id).await?;

    let booking = sqlx::query_as::<_, TransportBooking>("SELECT * FROM transport_bookings WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?
        .ok_or(AppError::NotFound("Transport booking not found".into()))?;

    Ok((booking, transport))
}

async fn seat_sum<'e, E>(
    executor: E,
    transport_id: &str,
    travel_date: NaiveDate,
    exclude_booking_id: Option<&str>,
) -> Result<i64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar::<_, i64>(
        r#"SELECT COALESCE(SUM(seats_booked), 0) FROM transport_bookings
           WHERE transport_id = $1
             AND travel_date = $2
             AND status != 'cancelled'
             AND id != $3"#
    )
        .bind(transport_id)
        .bind(travel_date)
        .bind(exclude_booking_id.unwrap_or(""))
        .fetch_one(executor)
        .await
        .map_err(AppError::Database)
}

fn seats_taken() -> AppError {
    AppError::Conflict("Not enough seats available on this date".into())
}

#[async_trait]
impl TransportBookingRepository for PostgresTransportBookingRepo {
    async fn create_if_available(&self, booking: &TransportBooking) -> Result<TransportBooking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let transport = lock_transport(&mut *tx, &booking.transport_id).await?;
        ensure_transport_open(&transport)?;

        let booked = seat_sum(&mut *tx, &booking.transport_id, booking.travel_date, None).await?;
        if !seats_fit(booked, booking.seats_booked, transport.total_capacity) {
            return Err(seats_taken());
        }

        let created = sqlx::query_as::<_, TransportBooking>(
            r#"INSERT INTO transport_bookings (
                id, tourist_id, transport_id, travel_date, seats_booked, total_price, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *"#
        )
            .bind(&booking.id)
            .bind(&booking.tourist_id)
            .bind(&booking.transport_id)
            .bind(booking.travel_date)
            .bind(booking.seats_booked)
            .bind(booking.total_price)
            .bind(&booking.status)
            .bind(booking.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn update_if_available(
        &self,
        id: &str,
        patch: TransportBookingPatch,
    ) -> Result<TransportBooking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let (mut booking, transport) = claim_booking(&mut *tx, id).await?;
        booking.apply_patch(patch)?;

        if booking.is_active() {
            let booked = seat_sum(&mut *tx, &booking.transport_id, booking.travel_date, Some(&booking.id)).await?;
            if !seats_fit(booked, booking.seats_booked, transport.total_capacity) {
                return Err(seats_taken());
            }
        }

        let updated = sqlx::query_as::<_, TransportBooking>(
            r#"UPDATE transport_bookings SET
                travel_date=$1, seats_booked=$2, total_price=$3, status=$4
               WHERE id=$5 RETURNING *"#
        )
            .bind(booking.travel_date)
            .bind(booking.seats_booked)
            .bind(booking.total_price)
            .bind(&booking.status)
            .bind(&booking.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TransportBooking>, AppError> {
        sqlx::query_as::<_, TransportBooking>("SELECT * FROM transport_bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_tourist(&self, tourist_id: &str) -> Result<Vec<TransportBooking>, AppError> {
        sqlx::query_as::<_, TransportBooking>(
            "SELECT * FROM transport_bookings WHERE tourist_id = $1 ORDER BY travel_date ASC"
        )
            .bind(tourist_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_driver(&self, driver_id: &str) -> Result<Vec<TransportBooking>, AppError> {
        sqlx::query_as::<_, TransportBooking>(
            r#"SELECT b.* FROM transport_bookings b
               JOIN transports t ON t.id = b.transport_id
               WHERE t.driver_id = $1
               ORDER BY b.travel_date ASC"#
        )
            .bind(driver_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_transport(&self, transport_id: &str) -> Result<Vec<TransportBooking>, AppError> {
        sqlx::query_as::<_, TransportBooking>(
            "SELECT * FROM transport_bookings WHERE transport_id = $1 ORDER BY travel_date ASC"
        )
            .bind(transport_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn cancel(&self, id: &str) -> Result<TransportBooking, AppError> {
        sqlx::query_as::<_, TransportBooking>(
            "UPDATE transport_bookings SET status = 'cancelled' WHERE id = $1 RETURNING *"
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM transport_bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Booking not found".into()));
        }
        Ok(())
    }

    async fn seats_booked_on(
        &self,
        transport_id: &str,
        travel_date: NaiveDate,
        exclude_booking_id: Option<&str>,
    ) -> Result<i64, AppError> {
        seat_sum(&self.pool, transport_id, travel_date, exclude_booking_id).await
    }
}
