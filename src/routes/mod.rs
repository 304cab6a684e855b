//! # routes
//!
//! Axum handlers, grouped by concern.  All of these are thin glue: they
//! parse the request, call into `engine` / the store, and shape the JSON
//! response.  No accounting arithmetic lives here.

pub mod account;
pub mod market;
pub mod portfolio;
pub mod trade;
