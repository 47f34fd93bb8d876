//! Collection repositories

pub mod user;
