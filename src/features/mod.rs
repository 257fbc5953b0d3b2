//! Feature preparation for the forecast backends.
//!
//! - ordinal time index + month features (`encoder`)
//! - monthly future-date generation (`calendar`)

pub mod calendar;
pub mod encoder;

pub use calendar::*;
pub use encoder::*;
