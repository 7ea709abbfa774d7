// --- File: crates/relatify_outlook/src/lib.rs ---
// Declare modules within this crate
pub mod auth;
#[cfg(test)]
mod auth_test;
pub mod doc;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod routes;
