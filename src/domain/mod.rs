//! Domain types for HR Core.
//!
//! This module contains the core business entities and value objects.

mod company;
mod contract;
mod dependent;
mod organization;
mod pagination;
mod reference;
mod rut;
mod user;
mod vacation;
mod worker;

pub use company::*;
pub use contract::*;
pub use dependent::*;
pub use organization::*;
pub use pagination::*;
pub use reference::*;
pub use rut::*;
pub use user::*;
pub use vacation::*;
pub use worker::*;
