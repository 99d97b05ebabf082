//! This module contains types shared across the MPOD interface.

use serde::Deserialize;
use strum_macros::{Display, EnumString};

/// The two kinds of power module hosted by a crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, EnumString, Display)]
pub enum DeviceKind {
    /// High voltage module, channels addressed from `u100`.
    #[serde(rename = "HV")]
    #[strum(serialize = "HV", ascii_case_insensitive)]
    Hv,
    /// Low voltage module, channels addressed from `u0`.
    #[serde(rename = "LV")]
    #[strum(serialize = "LV", ascii_case_insensitive)]
    Lv,
}

/// Used to be less ambiguous and whether something is on or off.
///
/// Parses the text forms `on` and `off` in any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum State {
    /// Disabled.
    #[default]
    Off,
    /// Enabled.
    On,
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}

/// Which community string a request is sent with.
///
/// The crate only accepts writes under the write community, so reads and writes can never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    Read,
    Write,
}

/// Result of a closed-loop operation which does not raise when the hardware fails to converge.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The setpoint was confirmed.
    Accepted(T),
    /// Every attempt was used up. The hardware is left as last observed.
    Failed,
}

impl<T> Outcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    /// The accepted value, or `None` after a failure.
    pub fn accepted(self) -> Option<T> {
        match self {
            Outcome::Accepted(value) => Some(value),
            Outcome::Failed => None,
        }
    }
}
