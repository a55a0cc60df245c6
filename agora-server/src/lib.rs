// Library exports for agora-server
// The binary and the integration tests both build the app from here

pub mod api;
pub mod config;
pub mod db;
pub mod password;
pub mod session;
pub mod state;
pub mod usecase;
pub mod validation;
