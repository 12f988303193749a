//! Authentication module for HR Core.
//!
//! Console users log in with email and password and receive a JWT that
//! carries their company and role. Every API route except login,
//! registration and health requires that token.

mod extract;
mod jwt;
mod middleware;
mod password;

pub use extract::*;
pub use jwt::*;
pub use middleware::*;
pub use password::*;
