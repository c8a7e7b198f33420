use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::{
    domain::favorite::Favorite,
    domain::place::{CategoryCount, Place, PlaceFilter, PlaceWithStats},
    domain::planned_route::PlannedRoute,
    domain::rating::Rating,
    domain::user::User,
    repository::errors::RepositoryError,
    usecase::contracts::{
        FavoriteRepository, PlaceRepository, PlannedRouteRepository, RatingRepository,
        UserRepository,
    },
};

#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PostgresRepository {
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        tracing::debug!("creating user");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, is_admin, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.is_admin)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(user_id = %user.id, "user created successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(user_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, is_admin, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self, identifier))]
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, is_admin, created_at
            FROM users
            WHERE username = $1 OR email = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self, username, email))]
    async fn identity_taken(&self, username: &str, email: &str) -> Result<bool, RepositoryError> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    #[tracing::instrument(skip(self, password_hash), fields(user_id = %id))]
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(id) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

impl PlaceRepository for PostgresRepository {
    #[tracing::instrument(skip(self, place), fields(place_id = %place.id))]
    async fn create(&self, place: &Place) -> Result<(), RepositoryError> {
        tracing::debug!("creating place");

        sqlx::query(
            r#"
            INSERT INTO places (id, name, description, category, region, image,
                                latitude, longitude, user_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(place.id)
        .bind(&place.name)
        .bind(&place.description)
        .bind(&place.category)
        .bind(&place.region)
        .bind(&place.image)
        .bind(place.latitude)
        .bind(place.longitude)
        .bind(place.user_id)
        .bind(place.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(place_id = %place.id, "place created successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(place_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Place>, RepositoryError> {
        let place = sqlx::query_as::<_, Place>(
            r#"
            SELECT id, name, description, category, region, image,
                   latitude, longitude, user_id, created_at
            FROM places
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(place)
    }

    #[tracing::instrument(skip(self, name))]
    async fn exists_by_name(&self, name: &str) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM places WHERE LOWER(name) = LOWER($1))",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip(self, filter))]
    async fn list_with_stats(
        &self,
        filter: &PlaceFilter,
    ) -> Result<Vec<PlaceWithStats>, RepositoryError> {
        tracing::debug!(?filter, "listing places with rating aggregates");

        let rows = sqlx::query_as::<_, PlaceWithStats>(
            r#"
            SELECT p.id, p.name, p.description, p.category, p.region, p.image,
                   p.latitude, p.longitude, p.user_id, p.created_at,
                   COALESCE(AVG(r.stars), 0) AS avg_rating,
                   COUNT(r.id) AS ratings_count
            FROM places p
            LEFT JOIN ratings r ON r.place_id = p.id
            WHERE ($1::text IS NULL OR p.category = $1)
              AND ($2::text IS NULL OR p.region = $2)
              AND ($3::text IS NULL OR p.name ILIKE '%' || $3 || '%')
              AND ($4::uuid IS NULL OR p.id IN
                   (SELECT place_id FROM favorites WHERE user_id = $4))
            GROUP BY p.id
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(&filter.category)
        .bind(&filter.region)
        .bind(&filter.name_contains)
        .bind(filter.favorites_of)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = rows.len(), "places listed");
        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Place>, RepositoryError> {
        let places = sqlx::query_as::<_, Place>(
            r#"
            SELECT id, name, description, category, region, image,
                   latitude, longitude, user_id, created_at
            FROM places
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(places)
    }

    #[tracing::instrument(skip(self))]
    async fn list_mapped(&self) -> Result<Vec<Place>, RepositoryError> {
        let places = sqlx::query_as::<_, Place>(
            r#"
            SELECT id, name, description, category, region, image,
                   latitude, longitude, user_id, created_at
            FROM places
            WHERE latitude IS NOT NULL AND longitude IS NOT NULL
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(places)
    }

    #[tracing::instrument(skip(self), fields(place_id = %id))]
    async fn delete_with_dependents(&self, id: Uuid) -> Result<(), RepositoryError> {
        tracing::debug!("deleting place and dependents");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM ratings WHERE place_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM favorites WHERE place_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM planned_routes WHERE place_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        tracing::debug!(place_id = %id, "place deleted with dependents");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn category_counts(&self) -> Result<Vec<CategoryCount>, RepositoryError> {
        let counts = sqlx::query_as::<_, CategoryCount>(
            r#"
            SELECT category, COUNT(id) AS count
            FROM places
            GROUP BY category
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    #[tracing::instrument(skip(self))]
    async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(id) FROM places")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

impl RatingRepository for PostgresRepository {
    #[tracing::instrument(skip(self, rating), fields(rating_id = %rating.id, place_id = %rating.place_id))]
    async fn create(&self, rating: &Rating) -> Result<(), RepositoryError> {
        tracing::debug!("creating rating");

        sqlx::query(
            r#"
            INSERT INTO ratings (id, user_id, place_id, stars, comment, photo, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(rating.id)
        .bind(rating.user_id)
        .bind(rating.place_id)
        .bind(rating.stars)
        .bind(&rating.comment)
        .bind(&rating.photo)
        .bind(rating.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(rating_id = %rating.id, "rating created successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(rating_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Rating>, RepositoryError> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, user_id, place_id, stars, comment, photo, created_at
            FROM ratings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rating)
    }

    #[tracing::instrument(skip(self), fields(place_id = %place_id))]
    async fn find_by_place(&self, place_id: Uuid) -> Result<Vec<Rating>, RepositoryError> {
        let ratings = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, user_id, place_id, stars, comment, photo, created_at
            FROM ratings
            WHERE place_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(place_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }

    #[tracing::instrument(skip(self), fields(rating_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(place_id = %place_id))]
    async fn average_for(&self, place_id: Uuid) -> Result<Option<f64>, RepositoryError> {
        let average = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(stars) FROM ratings WHERE place_id = $1",
        )
        .bind(place_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(average)
    }
}

impl FavoriteRepository for PostgresRepository {
    #[tracing::instrument(skip(self, favorite), fields(user_id = %favorite.user_id, place_id = %favorite.place_id))]
    async fn insert(&self, favorite: &Favorite) -> Result<bool, RepositoryError> {
        tracing::debug!("inserting favorite");

        // The unique index on (user_id, place_id) arbitrates concurrent
        // toggles; a losing insert is a no-op, not an error.
        let result = sqlx::query(
            r#"
            INSERT INTO favorites (id, user_id, place_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, place_id) DO NOTHING
            "#,
        )
        .bind(favorite.id)
        .bind(favorite.user_id)
        .bind(favorite.place_id)
        .bind(favorite.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id, place_id = %place_id))]
    async fn delete_by_pair(
        &self,
        user_id: Uuid,
        place_id: Uuid,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND place_id = $2")
            .bind(user_id)
            .bind(place_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id, place_id = %place_id))]
    async fn find_by_pair(
        &self,
        user_id: Uuid,
        place_id: Uuid,
    ) -> Result<Option<Favorite>, RepositoryError> {
        let favorite = sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, user_id, place_id, created_at
            FROM favorites
            WHERE user_id = $1 AND place_id = $2
            "#,
        )
        .bind(user_id)
        .bind(place_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(favorite)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<PlaceWithStats>, RepositoryError> {
        let rows = sqlx::query_as::<_, PlaceWithStats>(
            r#"
            SELECT p.id, p.name, p.description, p.category, p.region, p.image,
                   p.latitude, p.longitude, p.user_id, p.created_at,
                   COALESCE(AVG(r.stars), 0) AS avg_rating,
                   COUNT(r.id) AS ratings_count
            FROM favorites f
            JOIN places p ON p.id = f.place_id
            LEFT JOIN ratings r ON r.place_id = p.id
            WHERE f.user_id = $1
            GROUP BY p.id, f.created_at
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(user_id = %user_id, count = rows.len(), "favorites listed");
        Ok(rows)
    }
}

impl PlannedRouteRepository for PostgresRepository {
    #[tracing::instrument(skip(self, route), fields(route_id = %route.id, user_id = %route.user_id))]
    async fn create(&self, route: &PlannedRoute) -> Result<(), RepositoryError> {
        tracing::debug!("creating planned route");

        sqlx::query(
            r#"
            INSERT INTO planned_routes (id, user_id, place_id, visit_date, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(route.id)
        .bind(route.user_id)
        .bind(route.place_id)
        .bind(route.visit_date)
        .bind(route.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(route_id = %route.id, "planned route created successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(route_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PlannedRoute>, RepositoryError> {
        let route = sqlx::query_as::<_, PlannedRoute>(
            r#"
            SELECT id, user_id, place_id, visit_date, created_at
            FROM planned_routes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(route)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id, place_id = %place_id))]
    async fn find_by_pair(
        &self,
        user_id: Uuid,
        place_id: Uuid,
    ) -> Result<Option<PlannedRoute>, RepositoryError> {
        let route = sqlx::query_as::<_, PlannedRoute>(
            r#"
            SELECT id, user_id, place_id, visit_date, created_at
            FROM planned_routes
            WHERE user_id = $1 AND place_id = $2
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(place_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(route)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<PlannedRoute>, RepositoryError> {
        let routes = sqlx::query_as::<_, PlannedRoute>(
            r#"
            SELECT id, user_id, place_id, visit_date, created_at
            FROM planned_routes
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(routes)
    }

    #[tracing::instrument(skip(self), fields(route_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM planned_routes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
