// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod recipe_repository;
pub mod reference_repository;
pub mod relation_repository;
pub mod user_repository;

pub use recipe_repository::*;
pub use reference_repository::*;
pub use relation_repository::*;
pub use user_repository::*;
