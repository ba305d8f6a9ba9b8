//! Shop back office library
//!
//! Persistence schema, request payloads and services for an e-commerce back
//! office: suppliers, purchasing, inventory, catalog and orders.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod migrator;
pub mod services;

pub use errors::ServiceError;
pub use services::BackofficeServices;
