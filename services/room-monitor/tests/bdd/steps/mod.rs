//! BDD step definitions for the room monitor service

pub mod alert_steps;
pub mod cycle_steps;
