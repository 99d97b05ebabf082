//! This crate provides an interface for controlling the HV and LV modules of a WIENER MPOD crate over SNMP.
//!
//! Each physical module is driven through its own [`psu::PowerModule`], created from any transport which
//! implements [`transport::SnmpTransport`]. The transport only has to move requests and responses; channel
//! addressing, authority selection, the vendor float format and the status bitfield are all handled here.
//!
//! Setting a voltage or enabling an output is not synchronous on this hardware: the module ramps towards the
//! target over several seconds and may latch a fault on the way. [`psu::PowerModule::set_voltage`] and
//! [`psu::PowerModule::enable_output`] therefore write, wait, poll and retry until the setpoint is confirmed.
//!
//! Channels are numbered 1 to 8 on both module kinds:
//! * LV: channels 1 - 8 are addressed as `u0` - `u7`.
//! * HV: channels 1 - 8 are addressed as `u100` - `u107`.
//! * [`address::ALL_HV`] (64) and [`address::ALL_LV`] (128) address every output of a module at once.

pub mod address;
pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod psu;
mod ramp;
pub mod registers;
pub mod status;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mock_agent;
