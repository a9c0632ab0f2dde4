#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, the authentication core (token codec,"]
#![doc = "authenticator, registrar and the per-request authentication gate), the"]
#![doc = "persistence ports and adapters, routing configuration, and error handling"]
#![doc = "for the TaskGate service. It is used by the main binary (`main.rs`) to"]
#![doc = "construct and run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
