//! # FamilyHub API Server Library
//!
//! HTTP surface of the FamilyHub household task backend.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and current user middleware
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `response`: Success response envelope
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod response;
pub mod routes;
