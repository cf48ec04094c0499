pub mod generator;
pub mod models;
