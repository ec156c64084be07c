// Router API client modules
//
// Hand-written client for the DIR-series admin interface: digest login
// against `/devinfo`, then JSON-RPC table reads and writes on `/jsonrpc`.

pub mod auth;
pub mod client;
pub mod models;
pub mod tables;

pub use client::RouterClient;
