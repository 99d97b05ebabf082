//! Translation of logical channel numbers to the symbolic instance names used by the crate.

use thiserror::Error;

use crate::types::DeviceKind;

/// Logical channel number. `1..=8` for a single output, or one of the group addresses.
pub type Channel = i32;

/// Group address applying an action to every HV output.
pub const ALL_HV: Channel = 64;
/// Group address applying an action to every LV output.
pub const ALL_LV: Channel = 128;

/// Highest individually addressable channel.
pub const MAX_CHANNEL: Channel = 8;

const HV_OFFSET: Channel = 99;
const LV_OFFSET: Channel = -1;

/// A channel number outside `1..=8` which is not a group address either.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Channel {0} is outside 1-8 and is not a group address")]
pub struct InvalidChannel(pub Channel);

/// The instance part of an object name, e.g. the `u100` in `outputVoltage.u100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    /// A single output, rendered as `u<n>`.
    Output(u16),
    /// A group of outputs, rendered as the bare group number.
    Group(u16),
    /// A module slot, rendered as `ma<n>`.
    Module(u8),
    /// The `.0` instance of a scalar object such as `sysMainSwitch`.
    Scalar,
}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Address::Output(n) => write!(f, "u{}", n),
            Address::Group(n) => write!(f, "{}", n),
            Address::Module(n) => write!(f, "ma{}", n),
            Address::Scalar => write!(f, "0"),
        }
    }
}

/// Either a logical channel still to be translated, or an address that is already symbolic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRef {
    Logical(Channel),
    Symbolic(Address),
}

impl ChannelRef {
    /// Resolve to a symbolic address for the given module kind.
    pub fn resolve(self, kind: DeviceKind) -> Result<Address, InvalidChannel> {
        match self {
            ChannelRef::Logical(channel) => resolve_address(kind, channel),
            ChannelRef::Symbolic(address) => Ok(address),
        }
    }
}

impl From<Channel> for ChannelRef {
    fn from(value: Channel) -> Self {
        ChannelRef::Logical(value)
    }
}

impl From<Address> for ChannelRef {
    fn from(value: Address) -> Self {
        ChannelRef::Symbolic(value)
    }
}

/// Map a logical channel to its symbolic address.
///
/// LV channels 1 - 8 become `u0` - `u7`, HV channels 1 - 8 become `u100` - `u107`.
/// The group addresses [`ALL_HV`] and [`ALL_LV`] are passed through unchanged for either kind.
pub fn resolve_address(kind: DeviceKind, channel: Channel) -> Result<Address, InvalidChannel> {
    if channel == ALL_HV || channel == ALL_LV {
        return Ok(Address::Group(channel as u16));
    }
    if !(1..=MAX_CHANNEL).contains(&channel) {
        return Err(InvalidChannel(channel));
    }
    let offset = match kind {
        DeviceKind::Hv => HV_OFFSET,
        DeviceKind::Lv => LV_OFFSET,
    };
    Ok(Address::Output((channel + offset) as u16))
}

/// The group address covering every output of the given module kind.
pub fn group_address(kind: DeviceKind) -> Address {
    match kind {
        DeviceKind::Hv => Address::Group(ALL_HV as u16),
        DeviceKind::Lv => Address::Group(ALL_LV as u16),
    }
}

/// The slot address of the module itself, used for module-wide objects.
pub fn module_address(kind: DeviceKind) -> Address {
    match kind {
        DeviceKind::Lv => Address::Module(0),
        DeviceKind::Hv => Address::Module(1),
    }
}
