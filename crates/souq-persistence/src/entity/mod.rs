//! Document entity definitions

pub mod user;
