pub mod filters;
pub mod health;
