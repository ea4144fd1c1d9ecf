// src/services/recipe_service.rs
// DOCUMENTATION: Business logic for recipes
// PURPOSE: Validation, response assembly, authorship checks and recipe lists

use std::collections::{HashMap, HashSet};

use crate::config::Config;
use crate::db::{
    IngredientRepository, RecipeList, RecipeListRepository, RecipeRepository, TagRepository,
};
use crate::errors::FoodgramError;
use crate::models::{
    PageQuery, RecipeFilter, RecipeIngredientRow, RecipeRequest, RecipeResponse, RecipeRow,
    RecipeShort, Tag, User, MAX_AMOUNT, MIN_AMOUNT,
};
use crate::services::media::MediaStorage;
use crate::services::shopping_list::render_shopping_list;
use sqlx::PgPool;
use validator::Validate;

/// Checks that do not need the database: ranges and duplicates
pub fn check_recipe_shape(req: &RecipeRequest) -> Result<(), FoodgramError> {
    req.validate()?;

    let mut seen = HashSet::new();
    for item in &req.ingredients {
        if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&item.amount) {
            return Err(FoodgramError::ValidationError(format!(
                "ingredients: amount must be between {} and {}",
                MIN_AMOUNT, MAX_AMOUNT
            )));
        }
        if !seen.insert(item.id) {
            return Err(FoodgramError::ValidationError(
                "ingredients: each ingredient may appear only once".to_string(),
            ));
        }
    }

    let mut seen = HashSet::new();
    if let Some(dup) = req.tags.iter().find(|id| !seen.insert(**id)) {
        return Err(FoodgramError::ValidationError(format!(
            "tags: tag {} is listed twice",
            dup
        )));
    }

    Ok(())
}

/// First id in `wanted` that is absent from `existing`
pub fn first_missing(wanted: &[i64], existing: &[i64]) -> Option<i64> {
    let existing: HashSet<i64> = existing.iter().copied().collect();
    wanted.iter().copied().find(|id| !existing.contains(id))
}

pub struct RecipeService;

impl RecipeService {
    pub async fn list_recipes(
        pool: &PgPool,
        config: &Config,
        viewer_id: Option<i64>,
        filter: RecipeFilter,
        page: PageQuery,
    ) -> Result<(Vec<RecipeResponse>, i64), FoodgramError> {
        let filter = filter.for_viewer(viewer_id);
        let (rows, total) = RecipeRepository::list_recipes(pool, viewer_id, &filter, page).await?;
        let recipes = Self::assemble(pool, config, rows).await?;
        Ok((recipes, total))
    }

    pub async fn get_recipe(
        pool: &PgPool,
        config: &Config,
        id: i64,
        viewer_id: Option<i64>,
    ) -> Result<RecipeResponse, FoodgramError> {
        let row = RecipeRepository::get_recipe_row(pool, id, viewer_id).await?;
        Self::assemble(pool, config, vec![row])
            .await?
            .pop()
            .ok_or_else(|| FoodgramError::NotFound("Recipe".to_string()))
    }

    pub async fn create_recipe(
        pool: &PgPool,
        config: &Config,
        author: &User,
        req: RecipeRequest,
    ) -> Result<RecipeResponse, FoodgramError> {
        check_recipe_shape(&req)?;
        let image = req
            .image
            .as_deref()
            .filter(|i| !i.trim().is_empty())
            .ok_or_else(|| FoodgramError::ValidationError("image: this field is required".to_string()))?;
        Self::check_references(pool, &req).await?;

        let media = MediaStorage::new(&config.media_root);
        let image_path = media.save_recipe_image(image).await?;

        let id = match Self::insert_in_tx(pool, author.id, &req, &image_path).await {
            Ok(id) => id,
            Err(e) => {
                media.remove(&image_path).await;
                return Err(e);
            }
        };

        log::info!("User {} created recipe {}", author.id, id);
        Self::get_recipe(pool, config, id, Some(author.id)).await
    }

    async fn insert_in_tx(
        pool: &PgPool,
        author_id: i64,
        req: &RecipeRequest,
        image_path: &str,
    ) -> Result<i64, FoodgramError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| FoodgramError::from_db("Begin transaction", e))?;
        let id = RecipeRepository::insert_recipe(&mut tx, author_id, req, image_path).await?;
        RecipeRepository::replace_links(&mut tx, id, &req.ingredients, &req.tags).await?;
        tx.commit()
            .await
            .map_err(|e| FoodgramError::from_db("Commit recipe", e))?;
        Ok(id)
    }

    /// Replace a recipe's fields, ingredients and tags (author only)
    pub async fn update_recipe(
        pool: &PgPool,
        config: &Config,
        user: &User,
        id: i64,
        req: RecipeRequest,
    ) -> Result<RecipeResponse, FoodgramError> {
        let existing = RecipeRepository::get_recipe(pool, id).await?;
        if existing.author_id != user.id {
            return Err(FoodgramError::Forbidden);
        }
        check_recipe_shape(&req)?;
        Self::check_references(pool, &req).await?;

        let media = MediaStorage::new(&config.media_root);
        let new_image = match req.image.as_deref().filter(|i| !i.trim().is_empty()) {
            Some(data_url) => Some(media.save_recipe_image(data_url).await?),
            None => None,
        };

        let result: Result<(), FoodgramError> = async {
            let mut tx = pool
                .begin()
                .await
                .map_err(|e| FoodgramError::from_db("Begin transaction", e))?;
            RecipeRepository::update_recipe(&mut tx, id, &req, new_image.as_deref()).await?;
            RecipeRepository::replace_links(&mut tx, id, &req.ingredients, &req.tags).await?;
            tx.commit()
                .await
                .map_err(|e| FoodgramError::from_db("Commit recipe", e))
        }
        .await;

        match (result, new_image) {
            (Ok(()), Some(_)) => media.remove(&existing.image).await,
            (Ok(()), None) => {}
            (Err(e), new_image) => {
                if let Some(path) = new_image {
                    media.remove(&path).await;
                }
                return Err(e);
            }
        }

        log::info!("User {} updated recipe {}", user.id, id);
        Self::get_recipe(pool, config, id, Some(user.id)).await
    }

    pub async fn delete_recipe(
        pool: &PgPool,
        config: &Config,
        user: &User,
        id: i64,
    ) -> Result<(), FoodgramError> {
        let existing = RecipeRepository::get_recipe(pool, id).await?;
        if existing.author_id != user.id {
            return Err(FoodgramError::Forbidden);
        }
        RecipeRepository::delete_recipe(pool, id).await?;
        MediaStorage::new(&config.media_root)
            .remove(&existing.image)
            .await;
        Ok(())
    }

    /// Put a recipe into the user's favorites or cart
    pub async fn add_to_list(
        pool: &PgPool,
        config: &Config,
        list: RecipeList,
        user: &User,
        recipe_id: i64,
    ) -> Result<RecipeShort, FoodgramError> {
        let recipe = RecipeRepository::get_recipe(pool, recipe_id).await?;
        RecipeListRepository::add(pool, list, user.id, recipe.id).await?;
        log::info!("User {} added recipe {} to {}", user.id, recipe.id, list.label());
        Ok(recipe.to_short(&config.media_url))
    }

    pub async fn remove_from_list(
        pool: &PgPool,
        list: RecipeList,
        user: &User,
        recipe_id: i64,
    ) -> Result<(), FoodgramError> {
        RecipeRepository::get_recipe(pool, recipe_id).await?;
        if !RecipeListRepository::remove(pool, list, user.id, recipe_id).await? {
            return Err(FoodgramError::InvalidInput(format!(
                "Recipe is not in {}",
                list.label()
            )));
        }
        log::info!("User {} removed recipe {} from {}", user.id, recipe_id, list.label());
        Ok(())
    }

    /// Shopping list PDF summed over the user's cart
    pub async fn shopping_list(
        pool: &PgPool,
        config: &Config,
        user: &User,
    ) -> Result<Vec<u8>, FoodgramError> {
        let items = RecipeListRepository::shopping_list(pool, user.id).await?;
        log::info!("User {} downloaded a shopping list of {} items", user.id, items.len());
        render_shopping_list(&items, config.pdf_font_path.as_deref())
    }

    async fn check_references(pool: &PgPool, req: &RecipeRequest) -> Result<(), FoodgramError> {
        let ingredient_ids: Vec<i64> = req.ingredients.iter().map(|i| i.id).collect();
        let existing = IngredientRepository::existing_ids(pool, &ingredient_ids).await?;
        if let Some(missing) = first_missing(&ingredient_ids, &existing) {
            return Err(FoodgramError::ValidationError(format!(
                "ingredients: ingredient {} does not exist",
                missing
            )));
        }

        let existing = TagRepository::existing_ids(pool, &req.tags).await?;
        if let Some(missing) = first_missing(&req.tags, &existing) {
            return Err(FoodgramError::ValidationError(format!(
                "tags: tag {} does not exist",
                missing
            )));
        }
        Ok(())
    }

    /// Attach tags and ingredients to recipe rows, preserving row order
    async fn assemble(
        pool: &PgPool,
        config: &Config,
        rows: Vec<RecipeRow>,
    ) -> Result<Vec<RecipeResponse>, FoodgramError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in RecipeRepository::tags_for(pool, &ids).await? {
            tags.entry(row.recipe_id).or_default().push(row.into_tag());
        }

        let mut ingredients: HashMap<i64, Vec<RecipeIngredientRow>> = HashMap::new();
        for row in RecipeRepository::ingredients_for(pool, &ids).await? {
            ingredients.entry(row.recipe_id).or_default().push(row);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                row.into_response(
                    tags.remove(&id).unwrap_or_default(),
                    ingredients.remove(&id).unwrap_or_default(),
                    &config.media_url,
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IngredientAmount;

    fn request() -> RecipeRequest {
        RecipeRequest {
            ingredients: vec![
                IngredientAmount { id: 1, amount: 200 },
                IngredientAmount { id: 2, amount: 2 },
            ],
            tags: vec![1, 3],
            image: None,
            name: "Omelette".to_string(),
            text: "Whisk and cook".to_string(),
            cooking_time: 10,
        }
    }

    #[test]
    fn test_shape_accepts_valid_recipe() {
        assert!(check_recipe_shape(&request()).is_ok());
    }

    #[test]
    fn test_shape_rejects_duplicate_ingredient() {
        let mut req = request();
        req.ingredients.push(IngredientAmount { id: 1, amount: 5 });
        assert!(check_recipe_shape(&req).is_err());
    }

    #[test]
    fn test_shape_rejects_duplicate_tag() {
        let mut req = request();
        req.tags.push(3);
        assert!(check_recipe_shape(&req).is_err());
    }

    #[test]
    fn test_shape_rejects_amount_out_of_range() {
        let mut req = request();
        req.ingredients[1].amount = 0;
        assert!(check_recipe_shape(&req).is_err());
    }

    #[test]
    fn test_shape_rejects_long_name() {
        let mut req = request();
        req.name = "x".repeat(201);
        assert!(check_recipe_shape(&req).is_err());
    }

    #[test]
    fn test_first_missing() {
        assert_eq!(first_missing(&[1, 2, 3], &[3, 1, 2]), None);
        assert_eq!(first_missing(&[1, 5, 3], &[1, 3]), Some(5));
    }
}
