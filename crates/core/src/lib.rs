//! Draw engine for gift-exchange groups. Keep this crate free of IO and platform concerns.

pub mod assignment;
pub mod config;
pub mod draw;
pub mod exclusion;
pub mod feasibility;
pub mod group;
pub mod member;
pub mod rng;

pub use assignment::*;
pub use config::*;
pub use draw::*;
pub use exclusion::*;
pub use feasibility::*;
pub use group::*;
pub use member::*;
pub use rng::*;
