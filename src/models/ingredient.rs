// src/models/ingredient.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// Query string of GET /api/ingredients/
#[derive(Debug, Default, Deserialize)]
pub struct IngredientQuery {
    /// Case-insensitive name prefix
    pub name: Option<String>,
}

/// Ingredient as it appears inside a recipe, with its amount
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipeIngredientRow {
    #[serde(skip)]
    pub recipe_id: i64,
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i16,
}

/// One aggregated line of the shopping list
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}
