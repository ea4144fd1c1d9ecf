// src/db/reference_repository.rs
// DOCUMENTATION: Tags and ingredients (read-only reference data)

use crate::errors::FoodgramError;
use crate::models::{Ingredient, Tag};
use sqlx::PgPool;

pub struct TagRepository;

impl TagRepository {
    pub async fn list_tags(pool: &PgPool) -> Result<Vec<Tag>, FoodgramError> {
        sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(|e| FoodgramError::from_db("List tags", e))
    }

    pub async fn get_tag(pool: &PgPool, id: i64) -> Result<Tag, FoodgramError> {
        sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Fetch tag", e))?
            .ok_or_else(|| FoodgramError::NotFound("Tag".to_string()))
    }

    /// Which of `ids` exist
    pub async fn existing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, FoodgramError> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT id FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Check tags", e))?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

pub struct IngredientRepository;

/// Escape LIKE wildcards so user input only ever matches literally
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl IngredientRepository {
    /// List ingredients, optionally restricted to a case-insensitive name prefix
    pub async fn list_ingredients(
        pool: &PgPool,
        name_prefix: Option<&str>,
    ) -> Result<Vec<Ingredient>, FoodgramError> {
        let query = match name_prefix.map(str::trim).filter(|p| !p.is_empty()) {
            Some(prefix) => sqlx::query_as::<_, Ingredient>(
                r#"
                SELECT id, name, measurement_unit FROM ingredients
                WHERE LOWER(name) LIKE $1 || '%'
                ORDER BY name
                "#,
            )
            .bind(escape_like(&prefix.to_lowercase())),
            None => sqlx::query_as::<_, Ingredient>(
                "SELECT id, name, measurement_unit FROM ingredients ORDER BY name",
            ),
        };

        query
            .fetch_all(pool)
            .await
            .map_err(|e| FoodgramError::from_db("List ingredients", e))
    }

    pub async fn get_ingredient(pool: &PgPool, id: i64) -> Result<Ingredient, FoodgramError> {
        sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| FoodgramError::from_db("Fetch ingredient", e))?
        .ok_or_else(|| FoodgramError::NotFound("Ingredient".to_string()))
    }

    pub async fn existing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, FoodgramError> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT id FROM ingredients WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
            .map_err(|e| FoodgramError::from_db("Check ingredients", e))?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("сахар"), "сахар");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
