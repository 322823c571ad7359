pub mod admin;
pub mod auth;
pub mod checkout;
pub mod newsletter;
pub mod orders;
pub mod products;
pub mod profile;
pub mod reviews;
