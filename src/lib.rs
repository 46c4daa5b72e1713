//! People Enrichment API Library
//!
//! Stores person records in PostgreSQL and enriches new people with age,
//! gender and nationality guesses fetched concurrently from public
//! name-lookup providers.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Enrichment logic, models and errors.
//! - `integrations`: External provider clients and wire models.
//! - `aggregator`: Concurrent provider fan-out under a shared deadline.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `db_storage`: Person persistence and listing queries.
//! - `enrichment`: Merging provider answers into one result.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Person records, request bodies and listing filters.
//! - `openapi`: OpenAPI document.
//! - `provider_models`: Provider wire shapes and per-source results.
//! - `routes`: Router assembly.
//! - `source_client`: Single-provider HTTP client.

pub mod api;
pub mod core;
pub mod integrations;

pub mod aggregator;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod enrichment;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod provider_models;
pub mod routes;
pub mod source_client;
