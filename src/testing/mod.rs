//! Testing utilities: synthetic frames and a scripted camera session,
//! enabling reliable offline testing without requiring hardware.

pub mod session;
pub mod synthetic_data;
