pub mod config;
pub mod merged;
pub mod post;
pub mod price;
mod table;
