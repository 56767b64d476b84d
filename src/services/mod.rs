// Catalog administration
pub mod catalog;
