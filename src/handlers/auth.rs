// src/handlers/auth.rs
// DOCUMENTATION: Token login/logout handlers

use crate::config::Config;
use crate::errors::FoodgramError;
use crate::handlers::extractors::AuthUser;
use crate::models::TokenLoginRequest;
use crate::services::UserService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;

/// POST /api/auth/token/login/
/// Issue (or reuse) the user's token
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: web::Json<TokenLoginRequest>,
) -> Result<impl Responder, FoodgramError> {
    let token = UserService::login(pool.get_ref(), config.get_ref(), req.into_inner()).await?;
    Ok(HttpResponse::Created().json(token))
}

/// POST /api/auth/token/logout/
pub async fn logout(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, FoodgramError> {
    UserService::logout(pool.get_ref(), &user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth/token")
            .route("/login/", web::post().to(login))
            .route("/logout/", web::post().to(logout)),
    );
}
