//! This module is used to define the WIENER-CRATE-MIB objects used to drive the modules.

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum Command {
    /// __R__ - Output status bits.
    ///
    /// See [`StatusFlag`](crate::status::StatusFlag) for the meaning of each bit.
    OutputStatus,
    /// __R__ - Measured voltage at the sense lines. FLOATTYPE, volts.
    OutputMeasurementSenseVoltage,
    /// __R__ - Measured voltage at the output terminals. FLOATTYPE, volts.
    OutputMeasurementTerminalVoltage,
    /// __R__ - Measured output current. FLOATTYPE, amps.
    OutputMeasurementCurrent,
    /// __R/W__ - Output switch.
    ///
    /// See [`SwitchAction`] for the values which can be written.
    OutputSwitch,
    /// __R/W__ - Output voltage setpoint. FLOATTYPE, volts.
    OutputVoltage,
    /// __R/W__ - Output current limit. FLOATTYPE, amps.
    OutputCurrent,
    /// __W__ - Switch applied to a whole group of outputs.
    GroupsSwitch,
    /// __R/W__ - Crate main power switch. Scalar, always instance `.0`.
    SysMainSwitch,
    /// __R__ - Human readable module description.
    ModuleDescription,
}

/// Values accepted by `outputSwitch` and `groupsSwitch`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(i64)]
pub enum SwitchAction {
    Off = 0,
    On = 1,
    ResetEmergencyOff = 2,
    SetEmergencyOff = 3,
    /// Clear latched failure events so the output can be switched on again.
    ClearEvents = 10,
}

impl From<SwitchAction> for i64 {
    fn from(value: SwitchAction) -> Self {
        value as i64
    }
}

impl From<crate::types::State> for SwitchAction {
    fn from(value: crate::types::State) -> Self {
        match value {
            crate::types::State::Off => SwitchAction::Off,
            crate::types::State::On => SwitchAction::On,
        }
    }
}
