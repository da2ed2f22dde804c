use crate::domain::{
    models::listing::{ListingFilter, Transport, TransportPatch},
    ports::TransportRepository,
    services::availability::capacity_covers,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

pub struct PostgresTransportRepo {
    pool: PgPool,
}

impl PostgresTransportRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn lock_transport(conn: &mut PgConnection, id: &str) -> Result<Transport, AppError> {
    sqlx::query_as::<_, Transport>("SELECT * FROM transports WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?
        .ok_or(AppError::NotFound("Transport not found".into()))
}

async fn peak_seats_booked(conn: &mut PgConnection, transport_id: &str) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>(
        r#"SELECT COALESCE(MAX(day_total), 0)::BIGINT FROM (
               SELECT SUM(seats_booked) AS day_total FROM transport_bookings
               WHERE transport_id = $1 AND status != 'cancelled'
               GROUP BY travel_date
           ) AS per_day"#
    )
        .bind(transport_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::Database)
}

#[async_trait]
impl TransportRepository for PostgresTransportRepo {
    async fn create(&self, transport: &Transport) -> Result<Transport, AppError> {
        sqlx::query_as::<_, Transport>(
            r#"INSERT INTO transports (
                id, driver_id, vehicle_type, price_per_day, total_capacity, available, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *"#
        )
            .bind(&transport.id)
            .bind(&transport.driver_id)
            .bind(&transport.vehicle_type)
            .bind(transport.price_per_day)
            .bind(transport.total_capacity)
            .bind(transport.available)
            .bind(transport.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Transport>, AppError> {
        sqlx::query_as::<_, Transport>("SELECT * FROM transports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    // Transports carry no location, so only the availability filter applies.
    async fn list(&self, filter: &ListingFilter) -> Result<Vec<Transport>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM transports WHERE TRUE");
        if let Some(available) = filter.available {
            query.push(" AND available = ").push_bind(available);
        }
        query.push(" ORDER BY created_at ASC");

        query.build_query_as::<Transport>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_driver(&self, driver_id: &str) -> Result<Vec<Transport>, AppError> {
        sqlx::query_as::<_, Transport>("SELECT * FROM transports WHERE driver_id = $1 ORDER BY created_at ASC")
            .bind(driver_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_if_capacity_holds(&self, id: &str, patch: TransportPatch) -> Result<Transport, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let mut transport = lock_transport(&mut *tx, id).await?;
        transport.apply_patch(patch)?;

        let peak = peak_seats_booked(&mut *tx, &transport.id).await?;
        if !capacity_covers(peak, transport.total_capacity) {
            return Err(AppError::Conflict(format!(
                "Cannot reduce capacity to {}: {} seats are already booked on one date",
                transport.total_capacity, peak
            )));
        }

        let updated = sqlx::query_as::<_, Transport>(
            r#"UPDATE transports SET
                vehicle_type=$1, price_per_day=$2, total_capacity=$3, available=$4
               WHERE id=$5 RETURNING *"#
        )
            .bind(&transport.vehicle_type)
            .bind(transport.price_per_day)
            .bind(transport.total_capacity)
            .bind(transport.available)
            .bind(&transport.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM transports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Transport not found".into()));
        }
        Ok(())
    }
}
