//! Access token model and JWT expiry decoding.

pub mod token;

pub use token::*;
