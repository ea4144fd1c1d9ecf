// src/models/user.rs
// DOCUMENTATION: User accounts, authentication payloads and user DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::RecipeShort;

/// Username reserved for the /users/me/ endpoint
pub const RESERVED_USERNAME: &str = "me";

/// Represents a user record from the database
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

/// User row joined with the viewer's subscription flag
#[derive(Debug, Clone, FromRow)]
pub struct UserWithFlag {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

/// Request DTO for POST /api/users/
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email, length(max = 254))]
    pub email: String,

    #[validate(length(min = 1, max = 150), custom = "validate_username")]
    pub username: String,

    #[validate(length(min = 1, max = 150))]
    pub first_name: String,

    #[validate(length(min = 1, max = 150))]
    pub last_name: String,

    #[validate(custom = "validate_password")]
    pub password: String,
}

/// Request DTO for POST /api/users/set_password/
#[derive(Debug, Deserialize, Validate)]
pub struct SetPasswordRequest {
    #[validate(custom = "validate_password")]
    pub new_password: String,

    pub current_password: String,
}

/// Request DTO for POST /api/auth/token/login/
#[derive(Debug, Deserialize, Validate)]
pub struct TokenLoginRequest {
    #[validate(length(min = 1))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

/// Response for a freshly registered user
#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Public user representation
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

/// Author entry in the subscriptions list
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<RecipeShort>,
    pub recipes_count: i64,
}

impl User {
    pub fn to_created_response(&self) -> CreatedUserResponse {
        CreatedUserResponse {
            email: self.email.clone(),
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }

    pub fn to_response(&self, is_subscribed: bool) -> UserResponse {
        UserResponse {
            email: self.email.clone(),
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            is_subscribed,
        }
    }
}

impl UserWithFlag {
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            email: self.email.clone(),
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            is_subscribed: self.is_subscribed,
        }
    }
}

/// Letters, digits and @/./+/-/_ only; "me" is reserved
fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid_chars = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !valid_chars {
        return Err(ValidationError::new("invalid_username_characters"));
    }
    if username.eq_ignore_ascii_case(RESERVED_USERNAME) {
        return Err(ValidationError::new("reserved_username"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 8 {
        return Err(ValidationError::new("password_too_short"));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("password_entirely_numeric"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: "cook@example.com".to_string(),
            username: username.to_string(),
            first_name: "Julia".to_string(),
            last_name: "Child".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(request("julia.child+1", "bonappetit").validate().is_ok());
    }

    #[test]
    fn test_username_rules() {
        assert!(request("me", "bonappetit").validate().is_err());
        assert!(request("julia child", "bonappetit").validate().is_err());
        assert!(request("julia#", "bonappetit").validate().is_err());
        assert!(request(&"a".repeat(151), "bonappetit").validate().is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(request("julia", "short").validate().is_err());
        assert!(request("julia", "1234567890").validate().is_err());
    }

    #[test]
    fn test_email_is_checked() {
        let mut req = request("julia", "bonappetit");
        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());
    }
}
