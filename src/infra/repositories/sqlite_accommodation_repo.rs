use crate::domain::{models::listing::{Accommodation, ListingFilter}, ports::AccommodationRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub struct SqliteAccommodationRepo {
    pool: SqlitePool,
}

impl SqliteAccommodationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccommodationRepository for SqliteAccommodationRepo {
    async fn create(&self, accommodation: &Accommodation) -> Result<Accommodation, AppError> {
        sqlx::query_as::<_, Accommodation>(
            r#"INSERT INTO accommodations (
                id, host_id, title, description, location, price_per_night, capacity, available, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *"#
        )
            .bind(&accommodation.id)
            .bind(&accommodation.host_id)
            .bind(&accommodation.title)
            .bind(&accommodation.description)
            .bind(&accommodation.location)
            .bind(accommodation.price_per_night)
            .bind(accommodation.capacity)
            .bind(accommodation.available)
            .bind(accommodation.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Accommodation>, AppError> {
        sqlx::query_as::<_, Accommodation>("SELECT * FROM accommodations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, filter: &ListingFilter) -> Result<Vec<Accommodation>, AppError> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM accommodations WHERE 1 = 1");
        if let Some(location) = &filter.location {
            query.push(" AND location LIKE ").push_bind(format!("%{}%", location));
        }
        if let Some(available) = filter.available {
            query.push(" AND available = ").push_bind(available);
        }
        query.push(" ORDER BY created_at ASC");

        query.build_query_as::<Accommodation>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_host(&self, host_id: &str) -> Result<Vec<Accommodation>, AppError> {
        sqlx::query_as::<_, Accommodation>("SELECT * FROM accommodations WHERE host_id = ? ORDER BY created_at ASC")
            .bind(host_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, accommodation: &Accommodation) -> Result<Accommodation, AppError> {
        sqlx::query_as::<_, Accommodation>(
            r#"UPDATE accommodations SET
                title=?, description=?, location=?, price_per_night=?, capacity=?, available=?
               WHERE id=? RETURNING *"#
        )
            .bind(&accommodation.title)
            .bind(&accommodation.description)
            .bind(&accommodation.location)
            .bind(accommodation.price_per_night)
            .bind(accommodation.capacity)
            .bind(accommodation.available)
            .bind(&accommodation.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Accommodation not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM accommodations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Accommodation not found".into()));
        }
        Ok(())
    }
}
