pub mod assets;
pub mod categories;
pub mod common;
pub mod health;
pub mod products;
