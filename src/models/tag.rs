// src/models/tag.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Recipe tag (breakfast, lunch, ...); managed as reference data
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// Tag attached to a recipe, used when batch-loading tags for a page of recipes
#[derive(Debug, Clone, FromRow)]
pub struct RecipeTagRow {
    pub recipe_id: i64,
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl RecipeTagRow {
    pub fn into_tag(self) -> Tag {
        Tag {
            id: self.id,
            name: self.name,
            color: self.color,
            slug: self.slug,
        }
    }
}
