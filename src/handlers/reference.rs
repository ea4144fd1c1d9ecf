// src/handlers/reference.rs
// DOCUMENTATION: Read-only tag and ingredient endpoints (no pagination)

use crate::db::{IngredientRepository, TagRepository};
use crate::errors::FoodgramError;
use crate::models::IngredientQuery;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;

/// GET /api/tags/
pub async fn list_tags(pool: web::Data<PgPool>) -> Result<impl Responder, FoodgramError> {
    let tags = TagRepository::list_tags(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(tags))
}

/// GET /api/tags/{id}/
pub async fn get_tag(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<impl Responder, FoodgramError> {
    let tag = TagRepository::get_tag(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tag))
}

/// GET /api/ingredients/?name=<prefix>
pub async fn list_ingredients(
    pool: web::Data<PgPool>,
    query: web::Query<IngredientQuery>,
) -> Result<impl Responder, FoodgramError> {
    let ingredients =
        IngredientRepository::list_ingredients(pool.get_ref(), query.name.as_deref()).await?;
    Ok(HttpResponse::Ok().json(ingredients))
}

/// GET /api/ingredients/{id}/
pub async fn get_ingredient(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<impl Responder, FoodgramError> {
    let ingredient = IngredientRepository::get_ingredient(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ingredient))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tags")
            .route("/", web::get().to(list_tags))
            .route("/{id}/", web::get().to(get_tag)),
    )
    .service(
        web::scope("/ingredients")
            .route("/", web::get().to(list_ingredients))
            .route("/{id}/", web::get().to(get_ingredient)),
    );
}
