// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod ingredient;
pub mod pagination;
pub mod recipe;
pub mod tag;
pub mod user;

pub use ingredient::*;
pub use pagination::*;
pub use recipe::*;
pub use tag::*;
pub use user::*;
