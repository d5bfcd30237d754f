// Library exports for the golf course backend
// The binary in main.rs only wires configuration, logging and the listener

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod pages;
pub mod routes;
pub mod session;
pub mod state;
