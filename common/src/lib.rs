//! Wire types shared between the backend and its clients.
//!
//! The read models double as `sqlx::FromRow` projections, so a handler can
//! select straight into the type it returns.

pub mod activity;
pub mod auth;
pub mod hotel;
pub mod reservation;
pub mod status;
pub mod utils;

pub use activity::*;
pub use auth::*;
pub use hotel::*;
pub use reservation::*;
pub use status::*;
