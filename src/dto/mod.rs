pub mod auth;
pub mod cart;
pub mod favorites;
pub mod orders;
pub mod payments;
pub mod products;
