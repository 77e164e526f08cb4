//! Route model.
//!
//! # Data Flow
//! ```text
//! RouteLocation ("/user/1?tab=a#x" or structured)
//!     → location.rs (raw input)
//!     → model.rs resolve() against base + current URL
//!     → RouteMatcher (matched chain + params)
//!     → Route (pending, immutable matched chain)
//! ```

pub mod location;
pub mod model;

pub use location::RouteLocation;
pub use model::{resolve, Route, RouteStatus, RouteType};
