// src/db/user_repository.rs
// DOCUMENTATION: User and auth token database operations
// PURPOSE: Accounts, password updates and token lookup

use crate::errors::FoodgramError;
use crate::models::{CreateUserRequest, PageQuery, User, UserWithFlag};
use sqlx::PgPool;

/// Columns of UserWithFlag; $1 is the viewer id (NULL for anonymous)
const USER_WITH_FLAG_SELECT: &str = r#"
    SELECT
        u.id, u.email, u.username, u.first_name, u.last_name,
        EXISTS(
            SELECT 1 FROM subscriptions s
            WHERE s.user_id = $1 AND s.author_id = u.id
        ) AS is_subscribed
    FROM users u
"#;

pub struct UserRepository;

impl UserRepository {
    /// Insert a new account
    /// DOCUMENTATION: Duplicate email/username surfaces as AlreadyExists
    pub async fn create_user(
        pool: &PgPool,
        req: &CreateUserRequest,
        password_hash: &str,
    ) -> Result<User, FoodgramError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(req.email.trim().to_lowercase())
        .bind(req.username.trim())
        .bind(req.first_name.trim())
        .bind(req.last_name.trim())
        .bind(password_hash)
        .fetch_one(pool)
        .await
        .map_err(|e| match FoodgramError::from_db("Create user", e) {
            FoodgramError::AlreadyExists(_) => FoodgramError::AlreadyExists(
                "A user with this email or username already exists".to_string(),
            ),
            other => other,
        })?;

        log::info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    pub async fn get_by_id(pool: &PgPool, id: i64) -> Result<User, FoodgramError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Fetch user", e))?
            .ok_or_else(|| FoodgramError::NotFound("User".to_string()))
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, FoodgramError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Fetch user by email", e))
    }

    /// Get a user as seen by `viewer_id`
    pub async fn get_with_flag(
        pool: &PgPool,
        id: i64,
        viewer_id: Option<i64>,
    ) -> Result<UserWithFlag, FoodgramError> {
        let sql = format!("{} WHERE u.id = $2", USER_WITH_FLAG_SELECT);
        sqlx::query_as::<_, UserWithFlag>(&sql)
            .bind(viewer_id)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Fetch user", e))?
            .ok_or_else(|| FoodgramError::NotFound("User".to_string()))
    }

    /// Page through all users ordered by id
    pub async fn list_users(
        pool: &PgPool,
        viewer_id: Option<i64>,
        page: PageQuery,
    ) -> Result<(Vec<UserWithFlag>, i64), FoodgramError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Count users", e))?;

        let sql = format!("{} ORDER BY u.id LIMIT $2 OFFSET $3", USER_WITH_FLAG_SELECT);
        let users = sqlx::query_as::<_, UserWithFlag>(&sql)
            .bind(viewer_id)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
            .map_err(|e| FoodgramError::from_db("List users", e))?;

        Ok((users, total))
    }

    pub async fn update_password(
        pool: &PgPool,
        user_id: i64,
        password_hash: &str,
    ) -> Result<(), FoodgramError> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Update password", e))?;
        Ok(())
    }

    /// Return the user's token, creating it with `candidate` if none exists
    pub async fn get_or_create_token(
        pool: &PgPool,
        user_id: i64,
        candidate: &str,
    ) -> Result<String, FoodgramError> {
        let (key,): (String,) = sqlx::query_as(
            r#"
            INSERT INTO auth_tokens (key, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING key
            "#,
        )
        .bind(candidate)
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|e| FoodgramError::from_db("Issue token", e))?;
        Ok(key)
    }

    pub async fn find_by_token(pool: &PgPool, key: &str) -> Result<Option<User>, FoodgramError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            JOIN auth_tokens t ON t.user_id = u.id
            WHERE t.key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(|e| FoodgramError::from_db("Resolve token", e))
    }

    pub async fn delete_token(pool: &PgPool, user_id: i64) -> Result<(), FoodgramError> {
        sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Delete token", e))?;
        Ok(())
    }
}
