//! Core value types shared by the controller, the plant, and the loop
pub mod parameters;
pub mod state;
