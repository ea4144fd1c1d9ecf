// src/models/recipe.rs
// DOCUMENTATION: Core data structures for recipes
// PURPOSE: Database rows, request DTOs and API responses for recipes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::errors::FoodgramError;

use super::{RecipeIngredientRow, Tag, UserResponse};

pub const MIN_AMOUNT: i16 = 1;
pub const MAX_AMOUNT: i16 = 32000;

/// Recipe record as stored in the recipes table
#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    /// Path relative to MEDIA_ROOT
    pub image: String,
    pub text: String,
    pub cooking_time: i16,
    pub pub_date: DateTime<Utc>,
}

/// Recipe joined with its author and the viewer-dependent flags
/// DOCUMENTATION: One row per recipe; tags and ingredients are loaded separately
#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i16,
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub author_email: String,
    pub author_username: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_is_subscribed: bool,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Ingredient reference inside a create/update request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientAmount {
    pub id: i64,
    pub amount: i16,
}

/// Request DTO for POST /api/recipes/ and PATCH /api/recipes/{id}/
/// DOCUMENTATION: image is a base64 data URL; it is mandatory on create only
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecipeRequest {
    #[validate(length(min = 1))]
    pub ingredients: Vec<IngredientAmount>,

    #[validate(length(min = 1))]
    pub tags: Vec<i64>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1))]
    pub text: String,

    #[validate(range(min = 1, max = 32000))]
    pub cooking_time: i16,
}

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// Full recipe representation
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub tags: Vec<Tag>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientRow>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i16,
}

/// Short recipe form used by favorites, cart and subscriptions
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipeShort {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i16,
}

/// Filters accepted by GET /api/recipes/
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecipeFilter {
    pub author: Option<i64>,
    /// Tag slugs; a recipe matches if it has any of them
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true")
}

impl RecipeFilter {
    /// Parse filters from decoded query pairs
    /// DOCUMENTATION: `tags` may repeat; unknown keys (page, limit) are ignored
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, FoodgramError> {
        let mut filter = RecipeFilter::default();
        for (key, value) in pairs {
            match key.as_str() {
                "author" => {
                    let id = value.trim().parse::<i64>().map_err(|_| {
                        FoodgramError::InvalidInput(format!("author must be an integer, got '{}'", value))
                    })?;
                    filter.author = Some(id);
                }
                "tags" => {
                    let slug = value.trim();
                    if !slug.is_empty() && !filter.tags.iter().any(|t| t == slug) {
                        filter.tags.push(slug.to_string());
                    }
                }
                "is_favorited" => filter.is_favorited = is_truthy(value),
                "is_in_shopping_cart" => filter.is_in_shopping_cart = is_truthy(value),
                _ => {}
            }
        }
        Ok(filter)
    }

    /// Viewer-dependent flags only apply to authenticated users
    pub fn for_viewer(mut self, viewer_id: Option<i64>) -> Self {
        if viewer_id.is_none() {
            self.is_favorited = false;
            self.is_in_shopping_cart = false;
        }
        self
    }
}

/// Public URL of a stored media path
pub fn media_url(prefix: &str, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    format!("{}{}", prefix, path.trim_start_matches('/'))
}

impl Recipe {
    pub fn to_short(&self, media_prefix: &str) -> RecipeShort {
        RecipeShort {
            id: self.id,
            name: self.name.clone(),
            image: media_url(media_prefix, &self.image),
            cooking_time: self.cooking_time,
        }
    }
}

impl RecipeShort {
    /// Stored rows carry the relative media path; expose the public URL
    pub fn with_media_prefix(mut self, media_prefix: &str) -> Self {
        self.image = media_url(media_prefix, &self.image);
        self
    }
}

impl RecipeRow {
    pub fn author_response(&self) -> UserResponse {
        UserResponse {
            email: self.author_email.clone(),
            id: self.author_id,
            username: self.author_username.clone(),
            first_name: self.author_first_name.clone(),
            last_name: self.author_last_name.clone(),
            is_subscribed: self.author_is_subscribed,
        }
    }

    pub fn into_response(
        self,
        tags: Vec<Tag>,
        ingredients: Vec<RecipeIngredientRow>,
        media_prefix: &str,
    ) -> RecipeResponse {
        let author = self.author_response();
        RecipeResponse {
            id: self.id,
            tags,
            author,
            ingredients,
            is_favorited: self.is_favorited,
            is_in_shopping_cart: self.is_in_shopping_cart,
            image: media_url(media_prefix, &self.image),
            name: self.name,
            text: self.text,
            cooking_time: self.cooking_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_filter_parses_repeated_tags() {
        let filter = RecipeFilter::from_pairs(&pairs(&[
            ("page", "2"),
            ("tags", "breakfast"),
            ("tags", "dinner"),
            ("tags", "breakfast"),
            ("author", "7"),
        ]))
        .unwrap();

        assert_eq!(filter.tags, vec!["breakfast", "dinner"]);
        assert_eq!(filter.author, Some(7));
        assert!(!filter.is_favorited);
    }

    #[test]
    fn test_filter_flags() {
        let filter = RecipeFilter::from_pairs(&pairs(&[
            ("is_favorited", "1"),
            ("is_in_shopping_cart", "true"),
        ]))
        .unwrap();
        assert!(filter.is_favorited);
        assert!(filter.is_in_shopping_cart);

        let filter = RecipeFilter::from_pairs(&pairs(&[("is_favorited", "0")])).unwrap();
        assert!(!filter.is_favorited);
    }

    #[test]
    fn test_filter_flags_ignored_for_anonymous() {
        let filter = RecipeFilter::from_pairs(&pairs(&[("is_favorited", "1")]))
            .unwrap()
            .for_viewer(None);
        assert!(!filter.is_favorited);
    }

    #[test]
    fn test_filter_rejects_bad_author() {
        assert!(RecipeFilter::from_pairs(&pairs(&[("author", "abc")])).is_err());
    }

    #[test]
    fn test_media_url() {
        assert_eq!(
            media_url("/media/", "recipes/images/a.png"),
            "/media/recipes/images/a.png"
        );
        assert_eq!(media_url("/media/", ""), "");
    }

    #[test]
    fn test_recipe_request_validation() {
        let valid: RecipeRequest = serde_json::from_value(serde_json::json!({
            "ingredients": [{"id": 1, "amount": 10}],
            "tags": [1],
            "image": "data:image/png;base64,iVBORw0KGgo=",
            "name": "Pancakes",
            "text": "Mix and fry",
            "cooking_time": 15
        }))
        .unwrap();
        assert!(valid.validate().is_ok());

        let mut no_tags = valid.clone();
        no_tags.tags.clear();
        assert!(no_tags.validate().is_err());

        let mut zero_time = valid.clone();
        zero_time.cooking_time = 0;
        assert!(zero_time.validate().is_err());

        let mut no_ingredients = valid;
        no_ingredients.ingredients.clear();
        assert!(no_ingredients.validate().is_err());
    }

    #[test]
    fn test_recipe_name_is_trimmed_before_validation() {
        let body = |name: &str| {
            serde_json::json!({
                "ingredients": [{"id": 1, "amount": 10}],
                "tags": [1],
                "name": name,
                "text": "Mix and fry",
                "cooking_time": 15
            })
        };

        let blank: RecipeRequest = serde_json::from_value(body("   ")).unwrap();
        assert_eq!(blank.name, "");
        assert!(blank.validate().is_err());

        let padded: RecipeRequest = serde_json::from_value(body("  Pancakes \n")).unwrap();
        assert_eq!(padded.name, "Pancakes");
        assert!(padded.validate().is_ok());
    }
}
