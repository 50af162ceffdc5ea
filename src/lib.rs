//! Lead Intake API Library
//!
//! This library provides the contact-form backend: HTTP handlers that accept
//! and list lead submissions, the document store they persist into, and the
//! configuration and error plumbing around them.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core models, validation and errors.
//! - `data`: Data access layer.
//! - `app`: Router assembly and middleware.
//! - `config`: Configuration management.
//! - `db`: Database pool and store selection.
//! - `db_storage`: Document store trait and Postgres backend.
//! - `memory_storage`: In-memory document store.
//! - `errors`: Error handling types.
//! - `extract`: Request extractors with JSON error bodies.
//! - `handlers`: HTTP request handlers.
//! - `models`: Lead and response models.
//! - `openapi`: OpenAPI document.
//! - `validation`: Lead field validation.

pub mod api;
pub mod core;
pub mod data;

pub mod app;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod memory_storage;
pub mod models;
pub mod openapi;
pub mod validation;
