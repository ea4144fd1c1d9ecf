// src/services/user_service.rs
// DOCUMENTATION: Business logic for accounts, tokens and subscriptions
// PURPOSE: Intermediary between handlers and repositories

use std::collections::HashMap;

use crate::config::Config;
use crate::db::{RecipeRepository, SubscriptionRepository, UserRepository};
use crate::errors::FoodgramError;
use crate::models::{
    CreateUserRequest, CreatedUserResponse, PageQuery, RecipeShort, SetPasswordRequest,
    SubscriptionResponse, TokenLoginRequest, TokenResponse, User, UserResponse, UserWithFlag,
};
use crate::services::password::{hash_password, verify_password};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Length of issued auth tokens (hex characters)
pub const TOKEN_LENGTH: usize = 40;

/// Random hex token of TOKEN_LENGTH characters
pub fn generate_token() -> String {
    let mut token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    token.truncate(TOKEN_LENGTH);
    token
}

/// A DELETE that matched no row is a 404 for `what`
pub fn ensure_removed(removed: bool, what: &str) -> Result<(), FoodgramError> {
    if removed {
        Ok(())
    } else {
        Err(FoodgramError::NotFound(what.to_string()))
    }
}

pub struct UserService;

impl UserService {
    pub async fn register(
        pool: &PgPool,
        config: &Config,
        req: CreateUserRequest,
    ) -> Result<CreatedUserResponse, FoodgramError> {
        req.validate()?;
        let hash = hash_password(&req.password, &config.secret_key)?;
        let user = UserRepository::create_user(pool, &req, &hash).await?;
        Ok(user.to_created_response())
    }

    /// Exchange email and password for the user's auth token
    pub async fn login(
        pool: &PgPool,
        config: &Config,
        req: TokenLoginRequest,
    ) -> Result<TokenResponse, FoodgramError> {
        req.validate()?;
        let bad_credentials =
            || FoodgramError::InvalidInput("Unable to log in with provided credentials".to_string());

        let user = UserRepository::find_by_email(pool, &req.email)
            .await?
            .ok_or_else(bad_credentials)?;
        if !verify_password(&req.password, &user.password_hash, &config.secret_key)? {
            log::warn!("Failed login for user {}", user.id);
            return Err(bad_credentials());
        }

        let auth_token = UserRepository::get_or_create_token(pool, user.id, &generate_token()).await?;
        log::info!("User {} logged in", user.id);
        Ok(TokenResponse { auth_token })
    }

    pub async fn logout(pool: &PgPool, user: &User) -> Result<(), FoodgramError> {
        UserRepository::delete_token(pool, user.id).await?;
        log::info!("User {} logged out", user.id);
        Ok(())
    }

    pub async fn set_password(
        pool: &PgPool,
        config: &Config,
        user: &User,
        req: SetPasswordRequest,
    ) -> Result<(), FoodgramError> {
        req.validate()?;
        if !verify_password(&req.current_password, &user.password_hash, &config.secret_key)? {
            return Err(FoodgramError::InvalidInput(
                "Current password is incorrect".to_string(),
            ));
        }
        let hash = hash_password(&req.new_password, &config.secret_key)?;
        UserRepository::update_password(pool, user.id, &hash).await?;
        log::info!("User {} changed password", user.id);
        Ok(())
    }

    pub async fn get_user(
        pool: &PgPool,
        id: i64,
        viewer_id: Option<i64>,
    ) -> Result<UserResponse, FoodgramError> {
        let user = UserRepository::get_with_flag(pool, id, viewer_id).await?;
        Ok(user.to_response())
    }

    pub async fn list_users(
        pool: &PgPool,
        viewer_id: Option<i64>,
        page: PageQuery,
    ) -> Result<(Vec<UserResponse>, i64), FoodgramError> {
        let (users, total) = UserRepository::list_users(pool, viewer_id, page).await?;
        Ok((users.iter().map(UserWithFlag::to_response).collect(), total))
    }

    /// Follow an author and return it in subscription form
    pub async fn subscribe(
        pool: &PgPool,
        config: &Config,
        user: &User,
        author_id: i64,
        recipes_limit: Option<i64>,
    ) -> Result<SubscriptionResponse, FoodgramError> {
        let author = UserRepository::get_with_flag(pool, author_id, Some(user.id)).await?;
        if author.id == user.id {
            return Err(FoodgramError::InvalidInput(
                "You cannot subscribe to yourself".to_string(),
            ));
        }
        if author.is_subscribed {
            return Err(FoodgramError::AlreadyExists(
                "You are already subscribed to this author".to_string(),
            ));
        }

        SubscriptionRepository::subscribe(pool, user.id, author.id).await?;

        let author = UserWithFlag {
            is_subscribed: true,
            ..author
        };
        let mut entries = Self::with_recipes(pool, config, vec![author], recipes_limit).await?;
        entries.pop().ok_or(FoodgramError::InternalError)
    }

    pub async fn unsubscribe(pool: &PgPool, user: &User, author_id: i64) -> Result<(), FoodgramError> {
        UserRepository::get_by_id(pool, author_id).await?;
        let removed = SubscriptionRepository::unsubscribe(pool, user.id, author_id).await?;
        ensure_removed(removed, "Subscription")?;
        log::info!("User {} unsubscribed from {}", user.id, author_id);
        Ok(())
    }

    pub async fn subscriptions(
        pool: &PgPool,
        config: &Config,
        user: &User,
        page: PageQuery,
        recipes_limit: Option<i64>,
    ) -> Result<(Vec<SubscriptionResponse>, i64), FoodgramError> {
        let (authors, total) = SubscriptionRepository::list_authors(pool, user.id, page).await?;
        let entries = Self::with_recipes(pool, config, authors, recipes_limit).await?;
        Ok((entries, total))
    }

    /// Attach each author's newest recipes and recipe count
    async fn with_recipes(
        pool: &PgPool,
        config: &Config,
        authors: Vec<UserWithFlag>,
        recipes_limit: Option<i64>,
    ) -> Result<Vec<SubscriptionResponse>, FoodgramError> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = authors.iter().map(|a| a.id).collect();
        let limit = recipes_limit.filter(|l| *l >= 0);

        let mut recipes: HashMap<i64, Vec<RecipeShort>> = HashMap::new();
        for row in RecipeRepository::recipes_by_authors(pool, &ids, limit).await? {
            recipes
                .entry(row.author_id)
                .or_default()
                .push(row.into_short().with_media_prefix(&config.media_url));
        }
        let counts: HashMap<i64, i64> = RecipeRepository::count_by_authors(pool, &ids)
            .await?
            .into_iter()
            .collect();

        Ok(authors
            .into_iter()
            .map(|author| SubscriptionResponse {
                recipes: recipes.remove(&author.id).unwrap_or_default(),
                recipes_count: counts.get(&author.id).copied().unwrap_or(0),
                user: author.to_response(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_unsubscribing_twice_is_not_found() {
        use actix_web::{http::StatusCode, ResponseError};

        assert!(ensure_removed(true, "Subscription").is_ok());
        let err = ensure_removed(false, "Subscription").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Subscription not found");
    }
}
