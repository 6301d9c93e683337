use anyhow::Result;
use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::models::{MobileSession, Post, Restaurant, User};

pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let db = Database { pool };
        db.init_tables().await?;
        Ok(db)
    }

    async fn init_tables(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS restaurants (
                id SERIAL PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                name TEXT NOT NULL,
                description TEXT,
                cuisine TEXT,
                location TEXT,
                phone TEXT,
                website TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS social_accounts (
                id SERIAL PRIMARY KEY,
                restaurant_id INTEGER NOT NULL REFERENCES restaurants(id),
                platform TEXT NOT NULL,
                account_id TEXT NOT NULL,
                access_token TEXT,
                refresh_token TEXT,
                expires_at TIMESTAMPTZ,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id SERIAL PRIMARY KEY,
                restaurant_id INTEGER NOT NULL REFERENCES restaurants(id),
                content TEXT NOT NULL,
                media_urls TEXT NOT NULL DEFAULT '[]',
                platforms TEXT NOT NULL DEFAULT '[]',
                scheduled_time TIMESTAMPTZ,
                status TEXT NOT NULL DEFAULT 'draft',
                engagement_data TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS mobile_sessions (
                id SERIAL PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                token TEXT UNIQUE NOT NULL,
                device_id TEXT,
                push_token TEXT,
                last_active TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create a user together with their default restaurant row in one
    /// transaction. Returns `Ok(None)` when the email is already taken.
    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        restaurant_name: &str,
    ) -> Result<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await;

        let user_id: i32 = match inserted {
            Ok(row) => row.get(0),
            Err(e) => {
                if is_unique_violation(&e) {
                    return Ok(None);
                }
                return Err(e.into());
            }
        };

        sqlx::query(
            r#"
            INSERT INTO restaurants (user_id, name, description, cuisine, location, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user_id)
        .bind(restaurant_name)
        .bind(format!("A wonderful restaurant owned by {}", name))
        .bind("International")
        .bind("Your City")
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(user_id as i64))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(|row| User {
            id: Some(row.get::<i32, _>(0) as i64),
            name: row.get(1),
            email: row.get(2),
            password_hash: row.get(3),
            created_at: row.get(4),
        });

        Ok(user)
    }

    pub async fn get_restaurant_for_user(&self, user_id: i64) -> Result<Option<Restaurant>> {
        let restaurant = sqlx::query(
            r#"
            SELECT id, user_id, name, description, cuisine, location, phone, website, created_at
            FROM restaurants WHERE user_id = $1
            ORDER BY id LIMIT 1
            "#,
        )
        .bind(user_id as i32)
        .fetch_optional(&self.pool)
        .await?
        .map(|row| Restaurant {
            id: Some(row.get::<i32, _>(0) as i64),
            user_id: row.get::<i32, _>(1) as i64,
            name: row.get(2),
            description: row.get(3),
            cuisine: row.get(4),
            location: row.get(5),
            phone: row.get(6),
            website: row.get(7),
            created_at: row.get(8),
        });

        Ok(restaurant)
    }

    pub async fn create_post(&self, post: &Post) -> Result<i64> {
        let media_urls = serde_json::to_string(&post.media_urls)?;
        let platforms = serde_json::to_string(&post.platforms)?;
        let engagement = post
            .engagement_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let result = sqlx::query(
            r#"
            INSERT INTO posts (restaurant_id, content, media_urls, platforms,
                               scheduled_time, status, engagement_data, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(post.restaurant_id as i32)
        .bind(&post.content)
        .bind(media_urls)
        .bind(platforms)
        .bind(post.scheduled_time)
        .bind(post.status.to_string())
        .bind(engagement)
        .bind(post.created_at)
        .fetch_one(&self.pool)
        .await?;

        let id: i32 = result.get(0);
        Ok(id as i64)
    }

    pub async fn count_posts(&self, restaurant_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM posts WHERE restaurant_id = $1")
            .bind(restaurant_id as i32)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get(0))
    }

    pub async fn create_session(&self, session: &MobileSession) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO mobile_sessions (user_id, token, device_id, push_token, last_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(session.user_id as i32)
        .bind(&session.token)
        .bind(&session.device_id)
        .bind(&session.push_token)
        .bind(session.last_active)
        .fetch_one(&self.pool)
        .await?;

        let id: i32 = result.get(0);
        Ok(id as i64)
    }

    /// Resolve a bearer token to its user, or `None` for an unknown token.
    pub async fn get_session_user(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query(
            r#"
            SELECT u.id, u.name, u.email, u.password_hash, u.created_at
            FROM users u
            JOIN mobile_sessions s ON s.user_id = u.id
            WHERE s.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .map(|row| User {
            id: Some(row.get::<i32, _>(0) as i64),
            name: row.get(1),
            email: row.get(2),
            password_hash: row.get(3),
            created_at: row.get(4),
        });

        Ok(user)
    }

    pub async fn touch_session(&self, token: &str) -> Result<()> {
        sqlx::query("UPDATE mobile_sessions SET last_active = $1 WHERE token = $2")
            .bind(Utc::now())
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}
