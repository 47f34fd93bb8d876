//! Authentication services

pub mod google;
pub mod password;
pub mod token;
