//! Database models split into domain-specific modules.

pub mod coupon;
pub mod listing;
pub mod message;
pub mod saved_item;
pub mod user;

pub use coupon::*;
pub use listing::*;
pub use message::*;
pub use saved_item::*;
pub use user::*;
