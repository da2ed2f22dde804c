use crate::domain::{
    models::{
        booking::{AccommodationBooking, AccommodationBookingPatch},
        listing::Accommodation,
    },
    ports::AccommodationBookingRepository,
    services::availability::ensure_accommodation_open,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Executor, PgConnection, PgPool, Postgres};

pub struct PostgresAccommodationBookingRepo {
    pool: PgPool,
}

impl PostgresAccommodationBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row-locks the accommodation until the surrounding transaction ends.
async fn lock_accommodation(conn: &mut PgConnection, id: &str) -> Result<Accommodation, AppError> {
    sqlx::query_as::<_, Accommodation>("SELECT * FROM accommodations WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?
        .ok_or(AppError::NotFound("Accommodation not found".into()))
}

/// Locks the booking's accommodation, then the booking row itself, and
/// returns the booking as stored now. Lock order is listing first, the same
/// as admission.
async fn claim_booking(conn: &mut PgConnection, id: &str) -> Result<AccommodationBooking, AppError> {
    let accommodation_id = sqlx::query_scalar::<_, String>(
        "SELECT accommodation_id FROM accommodation_bookings WHERE id = $1"
    )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?
        .ok_or(AppError::NotFound("Accommodation booking not found".into()))?;

    lock_accommodation(&mut *conn, &accommodation_id).await?;

    sqlx::query_as::<_, AccommodationBooking>("SELECT * FROM accommodation_bookings WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?
        .ok_or(AppError::NotFound("Accommodation booking not found".into()))
}

async fn overlap_count<'e, E>(
    executor: E,
    accommodation_id: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
    exclude_booking_id: Option<&str>,
) -> Result<i64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM accommodation_bookings
           WHERE accommodation_id = $1
             AND check_in_date < $2
             AND check_out_date > $3
             AND status != 'cancelled'
             AND id != $4"#
    )
        .bind(accommodation_id)
        .bind(check_out)
        .bind(check_in)
        .bind(exclude_booking_id.unwrap_or(""))
        .fetch_one(executor)
        .await
        .map_err(AppError::Database)
}

fn dates_taken() -> AppError {
    AppError::Conflict("Dates already booked for this accommodation".into())
}

#[async_trait]
impl AccommodationBookingRepository for PostgresAccommodationBookingRepo {
    async fn create_if_available(&self, booking: &AccommodationBooking) -> Result<AccommodationBooking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let accommodation = lock_accommodation(&mut *tx, &booking.accommodation_id).await?;
        ensure_accommodation_open(&accommodation)?;

        let overlapping = overlap_count(
            &mut *tx,
            &booking.accommodation_id,
            booking.check_in_date,
            booking.check_out_date,
            None,
        ).await?;
        if overlapping > 0 {
            return Err(dates_taken());
        }

        let created = sqlx::query_as::<_, AccommodationBooking>(
            r#"INSERT INTO accommodation_bookings (
                id, tourist_id, accommodation_id, check_in_date, check_out_date, total_price, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *"#
        )
            .bind(&booking.id)
            .bind(&booking.tourist_id)
            .bind(&booking.accommodation_id)
            .bind(booking.check_in_date)
            .bind(booking.check_out_date)
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
        patch: AccommodationBookingPatch,
    ) -> Result<AccommodationBooking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let mut booking = claim_booking(&mut *tx, id).await?;
        booking.apply_patch(patch)?;

        if booking.is_active() {
            let overlapping = overlap_count(
                &mut *tx,
                &booking.accommodation_id,
                booking.check_in_date,
                booking.check_out_date,
                Some(&booking.id),
            ).await?;
            if overlapping > 0 {
                return Err(dates_taken());
            }
        }

        let updated = sqlx::query_as::<_, AccommodationBooking>(
            r#"UPDATE accommodation_bookings SET
                check_in_date=$1, check_out_date=$2, total_price=$3, status=$4
               WHERE id=$5 RETURNING *"#
        )
            .bind(booking.check_in_date)
            .bind(booking.check_out_date)
            .bind(booking.total_price)
            .bind(&booking.status)
            .bind(&booking.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AccommodationBooking>, AppError> {
        sqlx::query_as::<_, AccommodationBooking>("SELECT * FROM accommodation_bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_tourist(&self, tourist_id: &str) -> Result<Vec<AccommodationBooking>, AppError> {
        sqlx::query_as::<_, AccommodationBooking>(
            "SELECT * FROM accommodation_bookings WHERE tourist_id = $1 ORDER BY check_in_date ASC"
        )
            .bind(tourist_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_host(&self, host_id: &str) -> Result<Vec<AccommodationBooking>, AppError> {
        sqlx::query_as::<_, AccommodationBooking>(
            r#"SELECT b.* FROM accommodation_bookings b
               JOIN accommodations a ON a.id = b.accommodation_id
               WHERE a.host_id = $1
               ORDER BY b.check_in_date ASC"#
        )
            .bind(host_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_accommodation(&self, accommodation_id: &str) -> Result<Vec<AccommodationBooking>, AppError> {
        sqlx::query_as::<_, AccommodationBooking>(
            "SELECT * FROM accommodation_bookings WHERE accommodation_id = $1 ORDER BY check_in_date ASC"
        )
            .bind(accommodation_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn cancel(&self, id: &str) -> Result<AccommodationBooking, AppError> {
        sqlx::query_as::<_, AccommodationBooking>(
            "UPDATE accommodation_bookings SET status = 'cancelled' WHERE id = $1 RETURNING *"
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM accommodation_bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Booking not found".into()));
        }
        Ok(())
    }

    async fn count_overlapping(
        &self,
        accommodation_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude_booking_id: Option<&str>,
    ) -> Result<i64, AppError> {
        overlap_count(&self.pool, accommodation_id, check_in, check_out, exclude_booking_id).await
    }
}
