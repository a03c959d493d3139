pub mod action;
pub mod break_record;
pub mod events;
pub mod geo;
pub mod shift;
