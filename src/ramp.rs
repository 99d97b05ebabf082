//! Closed-loop "ramp and verify" sequences.
//!
//! Writing a setpoint only starts a ramp. The module moves towards the target over seconds and may latch a
//! fault while doing so, which has to be cleared before it will continue. Both voltage changes and switching an
//! output on run through the same state machine:
//!
//! ```text
//! Requested -> AwaitingFirstSettle -> AwaitingSecondSettle -> Accepted
//!                    |                        |
//!                    +--> RetryingAfterClear <+--> Requested (next attempt) ... -> Failed
//! ```
//!
//! Transport failures inside a sequence count as a failed attempt. Every other error is returned immediately.

use fugit::MillisDurationU32;

use crate::{
    address::{Address, ChannelRef},
    clock::Clock,
    config::RampConfig,
    error::Result,
    psu::{PowerModule, Setpoint, float_from},
    registers::{Command, SwitchAction},
    status::StatusFlag,
    transport::{SnmpTransport, Value},
    types::{Outcome, State},
};

/// What a sequence is trying to reach.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Goal {
    /// Output regulating at this many volts.
    Voltage(f32),
    /// Output switched on and regulating at its current setpoint.
    Enable,
}

impl Goal {
    fn command(self) -> Command {
        match self {
            Goal::Voltage(_) => Command::OutputVoltage,
            Goal::Enable => Command::OutputSwitch,
        }
    }

    fn setpoint(self) -> Setpoint {
        match self {
            Goal::Voltage(volts) => Setpoint::Float(volts),
            Goal::Enable => SwitchAction::On.into(),
        }
    }

    fn first_settle(self, ramp: &RampConfig) -> MillisDurationU32 {
        match self {
            Goal::Voltage(_) => MillisDurationU32::secs(ramp.voltage_settle_secs),
            Goal::Enable => MillisDurationU32::secs(ramp.enable_settle_secs),
        }
    }

    /// An output that is already regulating after the first wait needs no further checks.
    fn accepts_early(self) -> bool {
        matches!(self, Goal::Enable)
    }

    fn retry_pause(self, ramp: &RampConfig) -> Option<MillisDurationU32> {
        match self {
            Goal::Voltage(_) => None,
            Goal::Enable => Some(MillisDurationU32::secs(ramp.retry_pause_secs)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RampState {
    Requested { attempt: u32 },
    AwaitingFirstSettle { attempt: u32 },
    AwaitingSecondSettle { attempt: u32 },
    /// `pause` is false when the attempt was cut short by a latched start up fault.
    RetryingAfterClear { attempt: u32, pause: bool },
    Accepted,
    Failed,
}

/// Turn a transport failure into `None`, pass everything else through.
fn absorb<V, E>(result: Result<V, E>) -> Result<Option<V>, E>
where
    E: core::fmt::Debug + core::fmt::Display,
{
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_transient() => {
            tracing::warn!("{}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

impl<T: SnmpTransport, C: Clock> PowerModule<T, C> {
    /// Set the output voltage of a channel and wait until the module regulates at it.
    ///
    /// Returns the setpoint acknowledged by the crate, or [`Outcome::Failed`] once `tries` attempts have not
    /// converged. A target of exactly zero switches the output off instead, without any verification.
    pub fn set_voltage(
        &mut self,
        channel: impl Into<ChannelRef>,
        voltage: f32,
        tries: u32,
    ) -> Result<Outcome<f32>, T::Error> {
        let address = channel.into().resolve(self.kind())?;
        if voltage == 0.0 {
            tracing::debug!("Zero volt setpoint for {}, switching off", address);
            self.write(Command::OutputSwitch, address, SwitchAction::Off)?;
            return Ok(Outcome::Accepted(0.0));
        }

        tracing::debug!("Setting output voltage of {} to {} V", address, voltage);
        match self.run_ramp(address, Goal::Voltage(voltage), tries)? {
            Outcome::Accepted(Some(ack)) => Ok(Outcome::Accepted(float_from(Some(ack))?)),
            Outcome::Accepted(None) => Ok(Outcome::Accepted(voltage)),
            Outcome::Failed => Ok(Outcome::Failed),
        }
    }

    /// Switch an output on or off.
    ///
    /// Switching off is a single write. Switching on waits for the output to ramp to its setpoint and retries
    /// up to `tries` times, returning the acknowledgement of the successful write.
    pub fn enable_output(
        &mut self,
        channel: impl Into<ChannelRef>,
        state: impl Into<State>,
        tries: u32,
    ) -> Result<Outcome<Option<Value>>, T::Error> {
        let address = channel.into().resolve(self.kind())?;
        match state.into() {
            State::Off => {
                tracing::debug!("Turning {} OFF", address);
                let ack = self.write(Command::OutputSwitch, address, SwitchAction::Off)?;
                Ok(Outcome::Accepted(ack))
            }
            State::On => {
                tracing::debug!("Turning {} ON", address);
                self.run_ramp(address, Goal::Enable, tries)
            }
        }
    }

    /// Set voltage and current limit of a channel. The voltage goes through [`Self::set_voltage`] with the
    /// configured number of tries.
    pub fn set_output(
        &mut self,
        channel: impl Into<ChannelRef>,
        voltage: f32,
        current: f32,
    ) -> Result<(Outcome<f32>, f32), T::Error> {
        let channel = channel.into();
        tracing::debug!("Setting {:?} to {} V and {} A", channel, voltage, current);
        let tries = self.config().ramp.tries;
        let voltage_set = self.set_voltage(channel, voltage, tries)?;
        let current_set = self.set_current(channel, current)?;
        Ok((voltage_set, current_set))
    }

    fn run_ramp(
        &mut self,
        address: Address,
        goal: Goal,
        tries: u32,
    ) -> Result<Outcome<Option<Value>>, T::Error> {
        let ramp = self.config().ramp.clone();
        let first_settle = goal.first_settle(&ramp);
        let mut ack = None;
        let mut state = RampState::Requested { attempt: 1 };

        loop {
            tracing::trace!("{}: {:?}", address, state);
            state = match state {
                RampState::Requested { attempt } if attempt > tries => RampState::Failed,
                RampState::Requested { attempt } => {
                    tracing::debug!("{}: attempt {} of {}", address, attempt, tries);
                    match absorb(self.write(goal.command(), address, goal.setpoint()))? {
                        Some(value) => {
                            ack = value;
                            RampState::AwaitingFirstSettle { attempt }
                        }
                        None => RampState::RetryingAfterClear {
                            attempt,
                            pause: true,
                        },
                    }
                }
                RampState::AwaitingFirstSettle { attempt } => {
                    self.clock.sleep(first_settle);
                    match absorb(self.get_output_status(address))? {
                        None => RampState::RetryingAfterClear {
                            attempt,
                            pause: true,
                        },
                        Some(status) if status.contains(StatusFlag::OutputLowCurrentRange) => {
                            tracing::warn!("{}: latched {}, retrying", address, status);
                            RampState::RetryingAfterClear {
                                attempt,
                                pause: false,
                            }
                        }
                        Some(status) if goal.accepts_early() && status.is_regulating() => {
                            RampState::Accepted
                        }
                        Some(_) => RampState::AwaitingSecondSettle { attempt },
                    }
                }
                RampState::AwaitingSecondSettle { attempt } => {
                    match absorb(self.verify_settled(address, goal, &ramp, first_settle))? {
                        Some(true) => RampState::Accepted,
                        _ => {
                            tracing::warn!("{}: not settled after attempt {}", address, attempt);
                            RampState::RetryingAfterClear {
                                attempt,
                                pause: true,
                            }
                        }
                    }
                }
                RampState::RetryingAfterClear { attempt, pause } => {
                    absorb(self.clear_events(address))?;
                    if let Some(delay) = goal.retry_pause(&ramp).filter(|_| pause) {
                        self.clock.sleep(delay);
                    }
                    RampState::Requested {
                        attempt: attempt + 1,
                    }
                }
                RampState::Accepted => {
                    tracing::info!("{}: {:?} reached", address, goal);
                    return Ok(Outcome::Accepted(ack));
                }
                RampState::Failed => {
                    tracing::warn!("{}: {:?} not reached after {} attempts", address, goal, tries);
                    return Ok(Outcome::Failed);
                }
            };
        }
    }

    /// Wait out the rest of the ramp, then compare the measured voltage and regulation state.
    fn verify_settled(
        &mut self,
        address: Address,
        goal: Goal,
        ramp: &RampConfig,
        first_settle: MillisDurationU32,
    ) -> Result<bool, T::Error> {
        let target = match goal {
            Goal::Voltage(volts) => volts,
            Goal::Enable => self.get_voltage(address)?,
        };
        self.clock.sleep(ramp.second_settle(target, first_settle));

        let measured = self.meas_term_voltage(address)?;
        let status = self.get_output_status(address)?;
        tracing::debug!(
            "{}: measured {} V against {} V, status {}",
            address,
            measured,
            target,
            status
        );
        Ok(ramp.within_tolerance(measured, target) && status.is_regulating())
    }
}
