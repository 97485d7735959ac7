pub mod tick_limiter;
pub mod time_manager;
pub mod platform_specific;

pub use tick_limiter::*;
pub use time_manager::*;
