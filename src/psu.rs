use crate::{
    address::{Address, ChannelRef, group_address, module_address},
    clock::{Clock, SystemClock},
    codec::{DecodeError, decode_float, encode_float},
    config::ModuleConfig,
    error::{Error, ErrorStatus, Result},
    registers::{Command, SwitchAction},
    status::{OutputStatus, decode_status},
    transport::{ObjectName, Operation, Request, SnmpTransport, Value},
    types::{Authority, DeviceKind, State},
};

/// A value to be written. Floats are sent as FLOATTYPE, integers as plain INTEGER.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Setpoint {
    Float(f32),
    Integer(i64),
}

impl From<f32> for Setpoint {
    fn from(value: f32) -> Self {
        Setpoint::Float(value)
    }
}

impl From<i64> for Setpoint {
    fn from(value: i64) -> Self {
        Setpoint::Integer(value)
    }
}

impl From<SwitchAction> for Setpoint {
    fn from(value: SwitchAction) -> Self {
        Setpoint::Integer(value.into())
    }
}

impl From<State> for Setpoint {
    fn from(value: State) -> Self {
        SwitchAction::from(value).into()
    }
}

impl From<Setpoint> for Value {
    fn from(value: Setpoint) -> Self {
        match value {
            Setpoint::Float(v) => Value::Opaque(encode_float(v).to_vec()),
            Setpoint::Integer(v) => Value::Integer(v),
        }
    }
}

/// Everything the control panel shows for one channel, read in a single pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSnapshot {
    pub enabled: bool,
    pub voltage_setpoint: f32,
    pub terminal_voltage: f32,
    pub current_limit: f32,
    pub measured_current: f32,
    pub status: OutputStatus,
}

/// You can create a PowerModule using any transport which implements [SnmpTransport].
///
/// One handle drives one module (HV or LV) of the crate. For its methods, we generally use the nomenclature that
/// "set" means to write a setpoint and "get" means to read one back. Where as "meas" means to read a measured
/// value.
pub struct PowerModule<T: SnmpTransport, C: Clock = SystemClock> {
    transport: T,
    pub(crate) clock: C,
    config: ModuleConfig,
}

impl<T: SnmpTransport> PowerModule<T, SystemClock> {
    /// Create a new PowerModule which waits on the system clock.
    pub fn new(transport: T, config: ModuleConfig) -> Self {
        Self::with_clock(transport, SystemClock, config)
    }
}

impl<T: SnmpTransport, C: Clock> PowerModule<T, C> {
    /// Create a new PowerModule with a custom clock.
    pub fn with_clock(transport: T, clock: C, config: ModuleConfig) -> Self {
        Self {
            transport,
            clock,
            config,
        }
    }

    pub fn kind(&self) -> DeviceKind {
        self.config.kind
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Read `command` for a channel. Always sent with the read community.
    pub fn read(
        &mut self,
        command: Command,
        channel: impl Into<ChannelRef>,
    ) -> Result<Option<Value>, T::Error> {
        self.transact(Authority::Read, command, channel.into(), Operation::Get)
    }

    /// Write `value` to `command` for a channel. Always sent with the write community.
    ///
    /// Returns the value bound in the response, which the crate echoes back on success.
    pub fn write(
        &mut self,
        command: Command,
        channel: impl Into<ChannelRef>,
        value: impl Into<Setpoint>,
    ) -> Result<Option<Value>, T::Error> {
        let value = Value::from(value.into());
        self.transact(Authority::Write, command, channel.into(), Operation::Set(value))
    }

    /// Issue a single request and classify its response.
    fn transact(
        &mut self,
        authority: Authority,
        command: Command,
        channel: ChannelRef,
        operation: Operation,
    ) -> Result<Option<Value>, T::Error> {
        let address = channel.resolve(self.config.kind)?;
        let community = match authority {
            Authority::Read => self.config.read_community.clone(),
            Authority::Write => self.config.write_community.clone(),
        };
        let request = Request {
            endpoint: self.config.endpoint(),
            authority,
            community,
            object: ObjectName {
                mib: self.config.mib.clone(),
                command,
                address,
            },
            operation,
        };
        tracing::debug!(
            "Sending {:?} {} to {} module at {}",
            authority,
            request.object,
            self.config.kind,
            request.endpoint
        );

        let response = self
            .transport
            .exchange(&request)
            .map_err(Error::TransportError)?;

        if response.error_status != 0 {
            let element = (response.error_index as usize)
                .checked_sub(1)
                .and_then(|idx| response.bindings.get(idx))
                .map(|(object, _)| object.to_string())
                .unwrap_or_else(|| "?".to_string());
            return Err(Error::ProtocolError {
                status: ErrorStatus(response.error_status),
                element,
            });
        }
        Ok(response.bindings.into_iter().next().map(|(_, value)| value))
    }

    /// Return the output voltage setpoint in volts.
    pub fn get_voltage(&mut self, channel: impl Into<ChannelRef>) -> Result<f32, T::Error> {
        let raw = self.read(Command::OutputVoltage, channel)?;
        Ok(float_from(raw)?)
    }

    /// Return the voltage measured at the output terminals in volts.
    pub fn meas_term_voltage(&mut self, channel: impl Into<ChannelRef>) -> Result<f32, T::Error> {
        let raw = self.read(Command::OutputMeasurementTerminalVoltage, channel)?;
        Ok(float_from(raw)?)
    }

    /// Return the voltage measured at the sense lines in volts.
    pub fn meas_sense_voltage(&mut self, channel: impl Into<ChannelRef>) -> Result<f32, T::Error> {
        let raw = self.read(Command::OutputMeasurementSenseVoltage, channel)?;
        Ok(float_from(raw)?)
    }

    /// Return the output current limit in amps.
    pub fn get_current(&mut self, channel: impl Into<ChannelRef>) -> Result<f32, T::Error> {
        let raw = self.read(Command::OutputCurrent, channel)?;
        Ok(float_from(raw)?)
    }

    /// Return the measured output current in amps.
    pub fn meas_current(&mut self, channel: impl Into<ChannelRef>) -> Result<f32, T::Error> {
        let raw = self.read(Command::OutputMeasurementCurrent, channel)?;
        Ok(float_from(raw)?)
    }

    /// Set the output current limit in amps. Returns the limit as acknowledged by the crate.
    pub fn set_current(
        &mut self,
        channel: impl Into<ChannelRef>,
        current: f32,
    ) -> Result<f32, T::Error> {
        let channel = channel.into();
        tracing::debug!("Setting output current of {:?} to {} A", channel, current);
        let raw = self.write(Command::OutputCurrent, channel, current)?;
        Ok(float_from(raw)?)
    }

    /// Read whether the output is switched on.
    pub fn output_enabled(&mut self, channel: impl Into<ChannelRef>) -> Result<bool, T::Error> {
        let raw = self.read(Command::OutputSwitch, channel)?;
        Ok(switch_from(raw)? == SwitchAction::On as i64)
    }

    /// Read and decode the status bits of an output.
    pub fn get_output_status(
        &mut self,
        channel: impl Into<ChannelRef>,
    ) -> Result<OutputStatus, T::Error> {
        let raw = self.read(Command::OutputStatus, channel)?;
        let status = match raw {
            Some(Value::OctetString(bytes)) | Some(Value::Opaque(bytes)) => decode_status(&bytes),
            Some(other) => return Err(DecodeError::UnexpectedType(other.type_name()).into()),
            None => return Err(DecodeError::MissingValue.into()),
        };
        tracing::debug!("Output status: {}", status);
        Ok(status)
    }

    /// Clear the latched failure events of an output.
    pub fn clear_events(
        &mut self,
        channel: impl Into<ChannelRef>,
    ) -> Result<Option<Value>, T::Error> {
        let channel = channel.into();
        tracing::debug!("Clearing events of {:?}", channel);
        self.write(Command::OutputSwitch, channel, SwitchAction::ClearEvents)
    }

    /// Ramp down and switch off every output of this module.
    pub fn all_off(&mut self) -> Result<Option<Value>, T::Error> {
        tracing::debug!("Ramping down and turning off all {} channels", self.config.kind);
        let group = group_address(self.config.kind);
        self.write(Command::GroupsSwitch, group, SwitchAction::Off)
    }

    /// Clear the latched failure events of every output of this module.
    pub fn clear_all_events(&mut self) -> Result<Option<Value>, T::Error> {
        tracing::debug!("Clearing all {} events", self.config.kind);
        let group = group_address(self.config.kind);
        self.write(Command::GroupsSwitch, group, SwitchAction::ClearEvents)
    }

    /// Switch the whole crate on or off.
    pub fn set_crate_power(&mut self, state: impl Into<State>) -> Result<Option<Value>, T::Error> {
        let state = state.into();
        tracing::debug!("Set crate power to {:?}", state);
        self.write(Command::SysMainSwitch, Address::Scalar, state)
    }

    /// Read whether the crate is powered.
    pub fn get_crate_power(&mut self) -> Result<bool, T::Error> {
        let raw = self.read(Command::SysMainSwitch, Address::Scalar)?;
        Ok(switch_from(raw)? == SwitchAction::On as i64)
    }

    /// Read the description of this module.
    pub fn identify(&mut self) -> Result<String, T::Error> {
        let raw = self.read(Command::ModuleDescription, module_address(self.config.kind))?;
        match raw {
            Some(Value::OctetString(bytes)) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Some(other) => Err(DecodeError::UnexpectedType(other.type_name()).into()),
            None => Err(DecodeError::MissingValue.into()),
        }
    }

    /// Read everything shown for one channel.
    pub fn snapshot(
        &mut self,
        channel: impl Into<ChannelRef>,
    ) -> Result<ChannelSnapshot, T::Error> {
        let channel = channel.into();
        Ok(ChannelSnapshot {
            enabled: self.output_enabled(channel)?,
            voltage_setpoint: self.get_voltage(channel)?,
            terminal_voltage: self.meas_term_voltage(channel)?,
            current_limit: self.get_current(channel)?,
            measured_current: self.meas_current(channel)?,
            status: self.get_output_status(channel)?,
        })
    }
}

/// Interpret a FLOATTYPE response.
pub(crate) fn float_from(raw: Option<Value>) -> core::result::Result<f32, DecodeError> {
    match raw {
        Some(Value::Opaque(bytes)) => decode_float(&bytes),
        Some(other) => Err(DecodeError::UnexpectedType(other.type_name())),
        None => Err(DecodeError::MissingValue),
    }
}

fn switch_from(raw: Option<Value>) -> core::result::Result<i64, DecodeError> {
    match raw {
        Some(Value::Integer(value)) => Ok(value),
        Some(other) => Err(DecodeError::UnexpectedType(other.type_name())),
        None => Err(DecodeError::MissingValue),
    }
}
