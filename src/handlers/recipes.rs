// src/handlers/recipes.rs
// DOCUMENTATION: HTTP handlers for recipe operations
// PURPOSE: Parse requests, call services, return responses

use crate::config::Config;
use crate::db::RecipeList;
use crate::errors::FoodgramError;
use crate::handlers::extractors::{paginated, AuthUser, MaybeUser};
use crate::models::{PageQuery, RecipeFilter, RecipeRequest};
use crate::services::shopping_list::SHOPPING_LIST_FILENAME;
use crate::services::RecipeService;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;

/// GET /api/recipes/
/// Paginated list with author/tags/is_favorited/is_in_shopping_cart filters
pub async fn list_recipes(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    viewer: MaybeUser,
    query: web::Query<Vec<(String, String)>>,
) -> Result<impl Responder, FoodgramError> {
    let page = PageQuery::from_pairs(&query, config.page_size)?;
    let filter = RecipeFilter::from_pairs(&query)?;
    let (recipes, total) =
        RecipeService::list_recipes(pool.get_ref(), config.get_ref(), viewer.id(), filter, page)
            .await?;
    paginated(&req, recipes, total, page)
}

/// POST /api/recipes/
pub async fn create_recipe(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthUser,
    body: web::Json<RecipeRequest>,
) -> Result<impl Responder, FoodgramError> {
    let recipe =
        RecipeService::create_recipe(pool.get_ref(), config.get_ref(), &user.0, body.into_inner())
            .await?;
    Ok(HttpResponse::Created().json(recipe))
}

/// GET /api/recipes/{id}/
pub async fn get_recipe(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    viewer: MaybeUser,
    path: web::Path<i64>,
) -> Result<impl Responder, FoodgramError> {
    let recipe =
        RecipeService::get_recipe(pool.get_ref(), config.get_ref(), path.into_inner(), viewer.id())
            .await?;
    Ok(HttpResponse::Ok().json(recipe))
}

/// PATCH /api/recipes/{id}/
pub async fn update_recipe(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthUser,
    path: web::Path<i64>,
    body: web::Json<RecipeRequest>,
) -> Result<impl Responder, FoodgramError> {
    let recipe = RecipeService::update_recipe(
        pool.get_ref(),
        config.get_ref(),
        &user.0,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(recipe))
}

/// DELETE /api/recipes/{id}/
pub async fn delete_recipe(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<impl Responder, FoodgramError> {
    RecipeService::delete_recipe(pool.get_ref(), config.get_ref(), &user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn add_to_list(
    list: RecipeList,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, FoodgramError> {
    let recipe = RecipeService::add_to_list(
        pool.get_ref(),
        config.get_ref(),
        list,
        &user.0,
        path.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(recipe))
}

async fn remove_from_list(
    list: RecipeList,
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, FoodgramError> {
    RecipeService::remove_from_list(pool.get_ref(), list, &user.0, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/recipes/{id}/favorite/
pub async fn add_favorite(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, FoodgramError> {
    add_to_list(RecipeList::Favorites, pool, config, user, path).await
}

/// DELETE /api/recipes/{id}/favorite/
pub async fn remove_favorite(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, FoodgramError> {
    remove_from_list(RecipeList::Favorites, pool, user, path).await
}

/// POST /api/recipes/{id}/shopping_cart/
pub async fn add_to_cart(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, FoodgramError> {
    add_to_list(RecipeList::ShoppingCart, pool, config, user, path).await
}

/// DELETE /api/recipes/{id}/shopping_cart/
pub async fn remove_from_cart(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, FoodgramError> {
    remove_from_list(RecipeList::ShoppingCart, pool, user, path).await
}

/// GET /api/recipes/download_shopping_cart/
/// PDF attachment with summed ingredient amounts
pub async fn download_shopping_cart(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthUser,
) -> Result<impl Responder, FoodgramError> {
    let pdf = RecipeService::shopping_list(pool.get_ref(), config.get_ref(), &user.0).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(SHOPPING_LIST_FILENAME.to_string())],
        })
        .body(pdf))
}

/// Configuration for recipe routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/recipes")
            .route("/", web::get().to(list_recipes))
            .route("/", web::post().to(create_recipe))
            .route("/download_shopping_cart/", web::get().to(download_shopping_cart))
            .route("/{id}/", web::get().to(get_recipe))
            .route("/{id}/", web::patch().to(update_recipe))
            .route("/{id}/", web::delete().to(delete_recipe))
            .route("/{id}/favorite/", web::post().to(add_favorite))
            .route("/{id}/favorite/", web::delete().to(remove_favorite))
            .route("/{id}/shopping_cart/", web::post().to(add_to_cart))
            .route("/{id}/shopping_cart/", web::delete().to(remove_from_cart)),
    );
}
