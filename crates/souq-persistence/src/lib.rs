//! Souq Persistence - MongoDB client lifecycle and data access
//!
//! This crate provides:
//! - `MongoStore`: shared MongoDB client with named database handles
//! - Document entity definitions for the auth database
//! - Repository types encapsulating collection operations

pub mod entity;
pub mod mongo;
pub mod repository;

// Re-export the driver for convenience
pub use mongodb;

pub use entity::user::{ROLE_ADMIN, ROLE_CLIENT, UserDocument};
pub use mongo::MongoStore;
pub use repository::user::UserRepository;
