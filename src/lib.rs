pub mod auth;
pub mod models;
pub mod router;
pub mod server;
pub mod store;
pub mod storefront;
