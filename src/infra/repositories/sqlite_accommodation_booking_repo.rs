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
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

pub struct SqliteAccommodationBookingRepo {
    pool: SqlitePool,
}

impl SqliteAccommodationBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Takes the database write lock by touching the accommodation row, then
/// loads it. Must be the first statement of the transaction so that a
/// competing writer waits on the busy handler instead of failing.
async fn lock_accommodation(conn: &mut SqliteConnection, id: &str) -> Result<Accommodation, AppError> {
    let touched = sqlx::query("UPDATE accommodations SET available = available WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    if touched.rows_affected() == 0 {
        return Err(AppError::NotFound("Accommodation not found".into()));
    }

    sqlx::query_as::<_, Accommodation>("SELECT * FROM accommodations WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::Database)
}

/// Takes the write lock through the booking row, then locks its
/// accommodation. The returned booking is the row as stored now, so a
/// cancel that committed after the caller's read is seen here.
async fn claim_booking(conn: &mut SqliteConnection, id: &str) -> Result<AccommodationBooking, AppError> {
    let touched = sqlx::query("UPDATE accommodation_bookings SET status = status WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    if touched.rows_affected() == 0 {
        return Err(AppError::NotFound("Accommodation booking not found".into()));
    }

    let booking = sqlx::query_as::<_, AccommodationBooking>("SELECT * FROM accommodation_bookings WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    lock_accommodation(conn, &booking.accommodation_id).await?;
    Ok(booking)
}

async fn overlap_count<'e, E>(
    executor: E,
    accommodation_id: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
    exclude_booking_id: Option<&str>,
) -> Result<i64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM accommodation_bookings
           WHERE accommodation_id = ?
             AND check_in_date < ?
             AND check_out_date > ?
             AND status != 'cancelled'
             AND id != ?"#
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
impl AccommodationBookingRepository for SqliteAccommodationBookingRepo {
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
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
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

        // A cancelled booking holds no dates, so there is nothing to check.
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
                check_in_date=?, check_out_date=?, total_price=?, status=?
               WHERE id=? RETURNING *"#
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
        sqlx::query_as::<_, AccommodationBooking>("SELECT * FROM accommodation_bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_tourist(&self, tourist_id: &str) -> Result<Vec<AccommodationBooking>, AppError> {
        sqlx::query_as::<_, AccommodationBooking>(
            "SELECT * FROM accommodation_bookings WHERE tourist_id = ? ORDER BY check_in_date ASC"
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
               WHERE a.host_id = ?
               ORDER BY b.check_in_date ASC"#
        )
            .bind(host_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_accommodation(&self, accommodation_id: &str) -> Result<Vec<AccommodationBooking>, AppError> {
        sqlx::query_as::<_, AccommodationBooking>(
            "SELECT * FROM accommodation_bookings WHERE accommodation_id = ? ORDER BY check_in_date ASC"
        )
            .bind(accommodation_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn cancel(&self, id: &str) -> Result<AccommodationBooking, AppError> {
        sqlx::query_as::<_, AccommodationBooking>(
            "UPDATE accommodation_bookings SET status = 'cancelled' WHERE id = ? RETURNING *"
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM accommodation_bookings WHERE id = ?")
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
