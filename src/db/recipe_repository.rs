// src/db/recipe_repository.rs
// DOCUMENTATION: Database access layer for recipes
// PURPOSE: Recipe queries, filtered listing and ingredient/tag link maintenance

use crate::errors::FoodgramError;
use crate::models::*;
use sqlx::{FromRow, PgConnection, PgPool};

/// Recipe joined with author and viewer flags; $1 is the viewer id (NULL for anonymous)
const RECIPE_SELECT: &str = r#"
    SELECT
        r.id, r.name, r.image, r.text, r.cooking_time, r.pub_date,
        a.id AS author_id,
        a.email AS author_email,
        a.username AS author_username,
        a.first_name AS author_first_name,
        a.last_name AS author_last_name,
        EXISTS(
            SELECT 1 FROM subscriptions s
            WHERE s.user_id = $1 AND s.author_id = a.id
        ) AS author_is_subscribed,
        EXISTS(
            SELECT 1 FROM favorites f
            WHERE f.user_id = $1 AND f.recipe_id = r.id
        ) AS is_favorited,
        EXISTS(
            SELECT 1 FROM shopping_cart c
            WHERE c.user_id = $1 AND c.recipe_id = r.id
        ) AS is_in_shopping_cart
    FROM recipes r
    JOIN users a ON a.id = r.author_id
"#;

/// Filter predicate shared by the list and count queries ($1..$5)
const RECIPE_FILTER: &str = r#"
    WHERE ($2::BIGINT IS NULL OR r.author_id = $2)
      AND (
        CARDINALITY($3::TEXT[]) = 0
        OR EXISTS(
            SELECT 1 FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = r.id AND t.slug = ANY($3)
        )
      )
      AND (NOT $4 OR EXISTS(
            SELECT 1 FROM favorites f
            WHERE f.user_id = $1 AND f.recipe_id = r.id
      ))
      AND (NOT $5 OR EXISTS(
            SELECT 1 FROM shopping_cart c
            WHERE c.user_id = $1 AND c.recipe_id = r.id
      ))
"#;

/// Short recipe tagged with its author, for subscription listings
#[derive(Debug, Clone, FromRow)]
pub struct AuthorRecipeRow {
    pub author_id: i64,
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i16,
}

impl AuthorRecipeRow {
    pub fn into_short(self) -> RecipeShort {
        RecipeShort {
            id: self.id,
            name: self.name,
            image: self.image,
            cooking_time: self.cooking_time,
        }
    }
}

pub struct RecipeRepository;

impl RecipeRepository {
    /// Filtered, paginated recipe listing, newest first
    pub async fn list_recipes(
        pool: &PgPool,
        viewer_id: Option<i64>,
        filter: &RecipeFilter,
        page: PageQuery,
    ) -> Result<(Vec<RecipeRow>, i64), FoodgramError> {
        let count_sql = format!("SELECT COUNT(*) FROM recipes r {}", RECIPE_FILTER);
        let (total,): (i64,) = sqlx::query_as(&count_sql)
            .bind(viewer_id)
            .bind(filter.author)
            .bind(&filter.tags)
            .bind(filter.is_favorited)
            .bind(filter.is_in_shopping_cart)
            .fetch_one(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Count recipes", e))?;

        let sql = format!(
            "{} {} ORDER BY r.pub_date DESC, r.id DESC LIMIT $6 OFFSET $7",
            RECIPE_SELECT, RECIPE_FILTER
        );
        log::debug!("Listing recipes with filter {:?}", filter);

        let rows = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(viewer_id)
            .bind(filter.author)
            .bind(&filter.tags)
            .bind(filter.is_favorited)
            .bind(filter.is_in_shopping_cart)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
            .map_err(|e| FoodgramError::from_db("List recipes", e))?;

        Ok((rows, total))
    }

    /// Single recipe as seen by `viewer_id`
    pub async fn get_recipe_row(
        pool: &PgPool,
        id: i64,
        viewer_id: Option<i64>,
    ) -> Result<RecipeRow, FoodgramError> {
        let sql = format!("{} WHERE r.id = $2", RECIPE_SELECT);
        sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(viewer_id)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Fetch recipe", e))?
            .ok_or_else(|| FoodgramError::NotFound("Recipe".to_string()))
    }

    pub async fn find_recipe(pool: &PgPool, id: i64) -> Result<Option<Recipe>, FoodgramError> {
        sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Fetch recipe", e))
    }

    pub async fn get_recipe(pool: &PgPool, id: i64) -> Result<Recipe, FoodgramError> {
        Self::find_recipe(pool, id)
            .await?
            .ok_or_else(|| FoodgramError::NotFound("Recipe".to_string()))
    }

    /// Tags of the given recipes, ordered by tag id
    pub async fn tags_for(pool: &PgPool, recipe_ids: &[i64]) -> Result<Vec<RecipeTagRow>, FoodgramError> {
        sqlx::query_as::<_, RecipeTagRow>(
            r#"
            SELECT rt.recipe_id, t.id, t.name, t.color, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY t.id
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(pool)
        .await
        .map_err(|e| FoodgramError::from_db("Fetch recipe tags", e))
    }

    /// Ingredients with amounts of the given recipes, ordered by name
    pub async fn ingredients_for(
        pool: &PgPool,
        recipe_ids: &[i64],
    ) -> Result<Vec<RecipeIngredientRow>, FoodgramError> {
        sqlx::query_as::<_, RecipeIngredientRow>(
            r#"
            SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY i.name
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(pool)
        .await
        .map_err(|e| FoodgramError::from_db("Fetch recipe ingredients", e))
    }

    /// Insert the recipe row; links are written by `replace_links`
    pub async fn insert_recipe(
        conn: &mut PgConnection,
        author_id: i64,
        req: &RecipeRequest,
        image_path: &str,
    ) -> Result<i64, FoodgramError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO recipes (author_id, name, image, text, cooking_time, pub_date)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id
            "#,
        )
        .bind(author_id)
        .bind(req.name.trim())
        .bind(image_path)
        .bind(&req.text)
        .bind(req.cooking_time)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| FoodgramError::from_db("Create recipe", e))?;

        Ok(id)
    }

    /// Update scalar fields; the image is replaced only when a new path is given
    pub async fn update_recipe(
        conn: &mut PgConnection,
        id: i64,
        req: &RecipeRequest,
        image_path: Option<&str>,
    ) -> Result<(), FoodgramError> {
        sqlx::query(
            r#"
            UPDATE recipes
            SET name = $1,
                text = $2,
                cooking_time = $3,
                image = COALESCE($4, image)
            WHERE id = $5
            "#,
        )
        .bind(req.name.trim())
        .bind(&req.text)
        .bind(req.cooking_time)
        .bind(image_path)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| FoodgramError::from_db("Update recipe", e))?;

        Ok(())
    }

    /// Replace the recipe's ingredient amounts and tags
    pub async fn replace_links(
        conn: &mut PgConnection,
        recipe_id: i64,
        ingredients: &[IngredientAmount],
        tag_ids: &[i64],
    ) -> Result<(), FoodgramError> {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| FoodgramError::from_db("Clear recipe ingredients", e))?;

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| FoodgramError::from_db("Clear recipe tags", e))?;

        let ingredient_ids: Vec<i64> = ingredients.iter().map(|i| i.id).collect();
        let amounts: Vec<i16> = ingredients.iter().map(|i| i.amount).collect();

        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
            SELECT $1, ingredient_id, amount
            FROM UNNEST($2::BIGINT[], $3::SMALLINT[]) AS x(ingredient_id, amount)
            "#,
        )
        .bind(recipe_id)
        .bind(&ingredient_ids)
        .bind(&amounts)
        .execute(&mut *conn)
        .await
        .map_err(|e| FoodgramError::from_db("Link recipe ingredients", e))?;

        sqlx::query(
            r#"
            INSERT INTO recipe_tags (recipe_id, tag_id)
            SELECT $1, tag_id FROM UNNEST($2::BIGINT[]) AS x(tag_id)
            "#,
        )
        .bind(recipe_id)
        .bind(tag_ids)
        .execute(&mut *conn)
        .await
        .map_err(|e| FoodgramError::from_db("Link recipe tags", e))?;

        Ok(())
    }

    pub async fn delete_recipe(pool: &PgPool, id: i64) -> Result<(), FoodgramError> {
        sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Delete recipe", e))?;

        log::info!("Deleted recipe {}", id);
        Ok(())
    }

    /// Newest recipes per author, at most `per_author` each when given
    pub async fn recipes_by_authors(
        pool: &PgPool,
        author_ids: &[i64],
        per_author: Option<i64>,
    ) -> Result<Vec<AuthorRecipeRow>, FoodgramError> {
        sqlx::query_as::<_, AuthorRecipeRow>(
            r#"
            SELECT author_id, id, name, image, cooking_time
            FROM (
                SELECT r.author_id, r.id, r.name, r.image, r.cooking_time, r.pub_date,
                       ROW_NUMBER() OVER (
                           PARTITION BY r.author_id ORDER BY r.pub_date DESC, r.id DESC
                       ) AS position
                FROM recipes r
                WHERE r.author_id = ANY($1)
            ) ranked
            WHERE $2::BIGINT IS NULL OR position <= $2
            ORDER BY author_id, position
            "#,
        )
        .bind(author_ids)
        .bind(per_author)
        .fetch_all(pool)
        .await
        .map_err(|e| FoodgramError::from_db("Fetch author recipes", e))
    }

    /// Number of recipes per author
    pub async fn count_by_authors(
        pool: &PgPool,
        author_ids: &[i64],
    ) -> Result<Vec<(i64, i64)>, FoodgramError> {
        sqlx::query_as(
            r#"
            SELECT author_id, COUNT(*)
            FROM recipes
            WHERE author_id = ANY($1)
            GROUP BY author_id
            "#,
        )
        .bind(author_ids)
        .fetch_all(pool)
        .await
        .map_err(|e| FoodgramError::from_db("Count author recipes", e))
    }
}
