pub mod attendance;
pub mod breaks;
pub mod clock;
pub mod events;
pub mod scheduler;
pub mod stats;
pub mod transition;
pub mod validation;
