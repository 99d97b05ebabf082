//! Configuration of a single module handle.

use fugit::MillisDurationU32;
use serde::Deserialize;

use crate::{transport::Endpoint, types::DeviceKind};

fn default_port() -> u16 {
    161
}

fn default_read_community() -> String {
    "public".to_string()
}

fn default_write_community() -> String {
    "guru".to_string()
}

fn default_mib() -> String {
    "WIENER-CRATE-MIB".to_string()
}

/// Where a module lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleConfig {
    /// Address of the crate controller.
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Selects the channel addressing of the module.
    pub kind: DeviceKind,
    /// Community used for every read.
    #[serde(default = "default_read_community")]
    pub read_community: String,
    /// Community used for every write.
    #[serde(default = "default_write_community")]
    pub write_community: String,
    /// MIB module the object names belong to.
    #[serde(default = "default_mib")]
    pub mib: String,
    #[serde(default)]
    pub ramp: RampConfig,
}

impl ModuleConfig {
    /// Configuration with the factory communities for the given host.
    pub fn new(host: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            kind,
            read_community: default_read_community(),
            write_community: default_write_community(),
            mib: default_mib(),
            ramp: RampConfig::default(),
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// Timing and tolerances of the ramp-and-verify sequences.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RampConfig {
    /// Attempts made by [`set_output`](crate::psu::PowerModule::set_output).
    pub tries: u32,
    /// Wait after writing a voltage setpoint before the first status read.
    pub voltage_settle_secs: u32,
    /// Wait after switching an output on before the first status read.
    pub enable_settle_secs: u32,
    /// Extra pause before re-enabling an output that failed verification.
    pub retry_pause_secs: u32,
    /// Allowed difference between measured and target voltage.
    pub tolerance_volts: f32,
    /// Nominal ramp speed used to size the second wait.
    pub ramp_volts_per_sec: f32,
    /// Lower bound of the second wait.
    pub min_second_settle_secs: u32,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            tries: 3,
            voltage_settle_secs: 5,
            enable_settle_secs: 7,
            retry_pause_secs: 2,
            tolerance_volts: 1.0,
            ramp_volts_per_sec: 5.0,
            min_second_settle_secs: 1,
        }
    }
}

impl RampConfig {
    /// Time left to finish ramping to `target_volts` once `first_settle` has already passed.
    pub fn second_settle(
        &self,
        target_volts: f32,
        first_settle: MillisDurationU32,
    ) -> MillisDurationU32 {
        let ramp_secs = target_volts.abs() / self.ramp_volts_per_sec;
        let remaining_ms = ramp_secs * 1000.0 - first_settle.to_millis() as f32;
        let floor_ms = self.min_second_settle_secs * 1000;
        let delay_ms = if remaining_ms.is_finite() && remaining_ms > floor_ms as f32 {
            remaining_ms as u32
        } else {
            floor_ms
        };
        MillisDurationU32::millis(delay_ms)
    }

    pub fn within_tolerance(&self, measured: f32, target: f32) -> bool {
        (measured - target).abs() <= self.tolerance_volts
    }
}
