//! SME Financial Health API Library
//!
//! This library provides the rule-based financial health scorer for small and
//! medium enterprise surveys, the HTTP layer that exposes it, and a client for
//! talking to a running instance.
//!
//! # Modules
//!
//! - `scoring`: Health score, risk category and confidence distribution.
//! - `models`: Survey record and response types.
//! - `validation`: Required-field checks on submitted surveys.
//! - `handlers`: HTTP request handlers.
//! - `router`: Route table and middleware.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `client`: HTTP client for the API.

pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod router;
pub mod scoring;
pub mod validation;
