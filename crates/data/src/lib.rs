//! JSON persistence for groups and their draws.

pub mod load;
pub mod schema;
pub mod store;

pub use load::*;
pub use schema::*;
pub use store::*;
