// --- File: crates/relatify_calendar/src/lib.rs ---
// Declare modules within this crate
pub mod colors;
pub mod doc;
pub mod handlers;
pub mod local_store;
pub mod orchestrator;
pub mod routes;
