#![cfg_attr(not(test), no_std)]

pub mod alert;
pub mod config;
pub mod logic;
pub mod model;
pub mod modem;
pub mod sensor;
pub mod sim;
pub mod telemetry;
pub mod traits;

#[cfg(target_os = "none")]
pub mod display;
#[cfg(target_os = "none")]
pub mod hardware;
