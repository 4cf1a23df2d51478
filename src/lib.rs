// Library exports for Paw Pals
// This allows integration tests and the binary to share one module tree

pub mod adoption;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod ledger;
pub mod read_model;
pub mod routes;
pub mod state;
pub mod upstream;
pub mod users;
