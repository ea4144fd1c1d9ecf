// src/handlers/users.rs
// DOCUMENTATION: HTTP handlers for users and subscriptions
// PURPOSE: Parse requests, call services, return responses

use crate::config::Config;
use crate::errors::FoodgramError;
use crate::handlers::extractors::{paginated, AuthUser, MaybeUser};
use crate::models::{CreateUserRequest, PageQuery, SetPasswordRequest};
use crate::services::UserService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;

type QueryPairs = web::Query<Vec<(String, String)>>;

/// Optional `recipes_limit` capping the recipes listed per author
fn recipes_limit(pairs: &[(String, String)]) -> Result<Option<i64>, FoodgramError> {
    pairs
        .iter()
        .find(|(k, _)| k == "recipes_limit")
        .map(|(_, v)| {
            v.trim().parse::<i64>().map_err(|_| {
                FoodgramError::InvalidInput("recipes_limit must be an integer".to_string())
            })
        })
        .transpose()
}

/// GET /api/users/
pub async fn list_users(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    viewer: MaybeUser,
    query: QueryPairs,
) -> Result<impl Responder, FoodgramError> {
    let page = PageQuery::from_pairs(&query, config.page_size)?;
    let (users, total) = UserService::list_users(pool.get_ref(), viewer.id(), page).await?;
    paginated(&req, users, total, page)
}

/// POST /api/users/
pub async fn create_user(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    body: web::Json<CreateUserRequest>,
) -> Result<impl Responder, FoodgramError> {
    let user = UserService::register(pool.get_ref(), config.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// GET /api/users/{id}/
pub async fn get_user(
    pool: web::Data<PgPool>,
    viewer: MaybeUser,
    path: web::Path<i64>,
) -> Result<impl Responder, FoodgramError> {
    let user = UserService::get_user(pool.get_ref(), path.into_inner(), viewer.id()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// GET /api/users/me/
pub async fn me(user: AuthUser) -> Result<impl Responder, FoodgramError> {
    // Nobody subscribes to themselves
    Ok(HttpResponse::Ok().json(user.0.to_response(false)))
}

/// POST /api/users/set_password/
pub async fn set_password(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthUser,
    body: web::Json<SetPasswordRequest>,
) -> Result<impl Responder, FoodgramError> {
    UserService::set_password(pool.get_ref(), config.get_ref(), &user.0, body.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/users/subscriptions/
pub async fn subscriptions(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthUser,
    query: QueryPairs,
) -> Result<impl Responder, FoodgramError> {
    let page = PageQuery::from_pairs(&query, config.page_size)?;
    let limit = recipes_limit(&query)?;
    let (authors, total) =
        UserService::subscriptions(pool.get_ref(), config.get_ref(), &user.0, page, limit).await?;
    paginated(&req, authors, total, page)
}

/// POST /api/users/{id}/subscribe/
pub async fn subscribe(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthUser,
    path: web::Path<i64>,
    query: QueryPairs,
) -> Result<impl Responder, FoodgramError> {
    let limit = recipes_limit(&query)?;
    let author =
        UserService::subscribe(pool.get_ref(), config.get_ref(), &user.0, path.into_inner(), limit)
            .await?;
    Ok(HttpResponse::Created().json(author))
}

/// DELETE /api/users/{id}/subscribe/
pub async fn unsubscribe(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<impl Responder, FoodgramError> {
    UserService::unsubscribe(pool.get_ref(), &user.0, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configuration for user routes
/// Fixed paths are registered before /{id}/
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/", web::get().to(list_users))
            .route("/", web::post().to(create_user))
            .route("/me/", web::get().to(me))
            .route("/set_password/", web::post().to(set_password))
            .route("/subscriptions/", web::get().to(subscriptions))
            .route("/{id}/", web::get().to(get_user))
            .route("/{id}/subscribe/", web::post().to(subscribe))
            .route("/{id}/subscribe/", web::delete().to(unsubscribe)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipes_limit() {
        let pairs = vec![("recipes_limit".to_string(), "3".to_string())];
        assert_eq!(recipes_limit(&pairs).unwrap(), Some(3));
        assert_eq!(recipes_limit(&[]).unwrap(), None);

        let pairs = vec![("recipes_limit".to_string(), "all".to_string())];
        assert!(recipes_limit(&pairs).is_err());
    }
}
