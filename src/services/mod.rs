// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod media;
pub mod password;
pub mod recipe_service;
pub mod shopping_list;
pub mod user_service;

pub use recipe_service::*;
pub use user_service::*;
