//! # Model Layer
//!
//! Entities and their repositories.

pub mod store;
