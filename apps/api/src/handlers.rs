pub mod apify;
pub mod health;
