//! Souq Auth - tokens, passwords, and Google sign-in
//!
//! This crate owns everything credential-shaped:
//! - HS256 access tokens with a decode cache
//! - bcrypt password hashing
//! - Google ID token verification against Google's JWKS

pub mod model;
pub mod service;

pub use model::{AuthContext, JwtPayload, Token};
