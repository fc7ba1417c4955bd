//! JWT token verification

mod handler;
pub mod types;


pub use types::{Claims, JwtVerifier};
