//! Souq Common - shared types and error handling
//!
//! This crate provides the application error enum used across the Souq
//! workspace.

pub mod error;

pub use error::SouqError;
