// src/db/relation_repository.rs
// DOCUMENTATION: User-to-recipe lists and user-to-author subscriptions
// PURPOSE: Favorites, shopping cart, shopping list aggregation and follows

use crate::errors::FoodgramError;
use crate::models::{PageQuery, ShoppingListItem, UserWithFlag};
use sqlx::PgPool;

/// Per-user recipe collections sharing the same (user_id, recipe_id) shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeList {
    Favorites,
    ShoppingCart,
}

impl RecipeList {
    fn table(self) -> &'static str {
        match self {
            RecipeList::Favorites => "favorites",
            RecipeList::ShoppingCart => "shopping_cart",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecipeList::Favorites => "favorites",
            RecipeList::ShoppingCart => "shopping cart",
        }
    }
}

pub struct RecipeListRepository;

impl RecipeListRepository {
    /// Add a recipe; a second add is rejected by the unique constraint
    pub async fn add(
        pool: &PgPool,
        list: RecipeList,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<(), FoodgramError> {
        let sql = format!(
            "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2)",
            list.table()
        );
        sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(pool)
            .await
            .map_err(|e| match FoodgramError::from_db("Add to list", e) {
                FoodgramError::AlreadyExists(_) => FoodgramError::AlreadyExists(format!(
                    "Recipe is already in {}",
                    list.label()
                )),
                other => other,
            })?;
        Ok(())
    }

    /// Remove a recipe; returns false when it was not in the list
    pub async fn remove(
        pool: &PgPool,
        list: RecipeList,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool, FoodgramError> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            list.table()
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Remove from list", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Ingredients of every recipe in the cart, summed per (name, unit)
    pub async fn shopping_list(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Vec<ShoppingListItem>, FoodgramError> {
        sqlx::query_as::<_, ShoppingListItem>(
            r#"
            SELECT i.name, i.measurement_unit, SUM(ri.amount)::BIGINT AS amount
            FROM shopping_cart c
            JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE c.user_id = $1
            GROUP BY i.name, i.measurement_unit
            ORDER BY i.name, i.measurement_unit
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| FoodgramError::from_db("Aggregate shopping list", e))
    }
}

pub struct SubscriptionRepository;

impl SubscriptionRepository {
    pub async fn subscribe(pool: &PgPool, user_id: i64, author_id: i64) -> Result<(), FoodgramError> {
        sqlx::query("INSERT INTO subscriptions (user_id, author_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(author_id)
            .execute(pool)
            .await
            .map_err(|e| match FoodgramError::from_db("Subscribe", e) {
                FoodgramError::AlreadyExists(_) => FoodgramError::AlreadyExists(
                    "You are already subscribed to this author".to_string(),
                ),
                other => other,
            })?;

        log::info!("User {} subscribed to {}", user_id, author_id);
        Ok(())
    }

    pub async fn unsubscribe(pool: &PgPool, user_id: i64, author_id: i64) -> Result<bool, FoodgramError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Unsubscribe", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Authors followed by `user_id`, most recent subscription first
    pub async fn list_authors(
        pool: &PgPool,
        user_id: i64,
        page: PageQuery,
    ) -> Result<(Vec<UserWithFlag>, i64), FoodgramError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscriptions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Count subscriptions", e))?;

        let authors = sqlx::query_as::<_, UserWithFlag>(
            r#"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name,
                   TRUE AS is_subscribed
            FROM subscriptions s
            JOIN users u ON u.id = s.author_id
            WHERE s.user_id = $1
            ORDER BY s.created DESC, s.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await
        .map_err(|e| FoodgramError::from_db("List subscriptions", e))?;

        Ok((authors, total))
    }
}
