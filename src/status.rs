//! Decoding of the `outputStatus` BITS value.
//!
//! The crate sends the status as a BITS string where bit 0 is the most significant bit of the first byte.

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Conditions reported in `outputStatus`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum StatusFlag {
    OutputOn,
    OutputInhibit,
    OutputFailureMinSenseVoltage,
    OutputFailureMaxSenseVoltage,
    OutputFailureMaxTerminalVoltage,
    OutputFailureMaxCurrent,
    OutputFailureMaxTemperature,
    OutputFailureMaxPower,
    OutputFailureTimeout,
    OutputCurrentLimited,
    OutputRampUp,
    OutputRampDown,
    OutputEnableKill,
    OutputEmergencyOff,
    OutputAdjusting,
    /// The output is regulating at its setpoint.
    OutputConstantVoltage,
    /// Latched during start up; must be cleared before the output will ramp.
    OutputLowCurrentRange,
    OutputCurrentBoundsExceeded,
    OutputFailureCurrentLimit,
    OutputCurrentIncreasing,
    OutputCurrentDecreasing,
    OutputConstantPower,
    OutputVoltageRampSpeedLimited,
    OutputVoltageBottomReached,
    OutputInitCrcCheckBad,
}

/// Bit position to flag. Bit 8 is reserved.
pub static STATUS_BITS: [Option<StatusFlag>; 26] = {
    use StatusFlag as SF;
    [
        Some(SF::OutputOn),
        Some(SF::OutputInhibit),
        Some(SF::OutputFailureMinSenseVoltage),
        Some(SF::OutputFailureMaxSenseVoltage),
        Some(SF::OutputFailureMaxTerminalVoltage),
        Some(SF::OutputFailureMaxCurrent),
        Some(SF::OutputFailureMaxTemperature),
        Some(SF::OutputFailureMaxPower),
        None,
        Some(SF::OutputFailureTimeout),
        Some(SF::OutputCurrentLimited),
        Some(SF::OutputRampUp),
        Some(SF::OutputRampDown),
        Some(SF::OutputEnableKill),
        Some(SF::OutputEmergencyOff),
        Some(SF::OutputAdjusting),
        Some(SF::OutputConstantVoltage),
        Some(SF::OutputLowCurrentRange),
        Some(SF::OutputCurrentBoundsExceeded),
        Some(SF::OutputFailureCurrentLimit),
        Some(SF::OutputCurrentIncreasing),
        Some(SF::OutputCurrentDecreasing),
        Some(SF::OutputConstantPower),
        Some(SF::OutputVoltageRampSpeedLimited),
        Some(SF::OutputVoltageBottomReached),
        Some(SF::OutputInitCrcCheckBad),
    ]
};

impl StatusFlag {
    /// Bit position of this flag within the BITS string.
    pub fn bit(self) -> usize {
        use StatusFlag as SF;
        match self {
            SF::OutputOn => 0,
            SF::OutputInhibit => 1,
            SF::OutputFailureMinSenseVoltage => 2,
            SF::OutputFailureMaxSenseVoltage => 3,
            SF::OutputFailureMaxTerminalVoltage => 4,
            SF::OutputFailureMaxCurrent => 5,
            SF::OutputFailureMaxTemperature => 6,
            SF::OutputFailureMaxPower => 7,
            // bit 8 reserved
            SF::OutputFailureTimeout => 9,
            SF::OutputCurrentLimited => 10,
            SF::OutputRampUp => 11,
            SF::OutputRampDown => 12,
            SF::OutputEnableKill => 13,
            SF::OutputEmergencyOff => 14,
            SF::OutputAdjusting => 15,
            SF::OutputConstantVoltage => 16,
            SF::OutputLowCurrentRange => 17,
            SF::OutputCurrentBoundsExceeded => 18,
            SF::OutputFailureCurrentLimit => 19,
            SF::OutputCurrentIncreasing => 20,
            SF::OutputCurrentDecreasing => 21,
            SF::OutputConstantPower => 22,
            SF::OutputVoltageRampSpeedLimited => 23,
            SF::OutputVoltageBottomReached => 24,
            SF::OutputInitCrcCheckBad => 25,
        }
    }
}

/// The set flags of one `outputStatus` reading, in ascending bit order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputStatus(Vec<StatusFlag>);

impl OutputStatus {
    pub fn contains(&self, flag: StatusFlag) -> bool {
        self.0.contains(&flag)
    }

    pub fn flags(&self) -> &[StatusFlag] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// MIB names of the set flags.
    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|flag| (*flag).into()).collect()
    }

    /// Whether the output has settled at its setpoint.
    pub fn is_regulating(&self) -> bool {
        self.contains(StatusFlag::OutputConstantVoltage)
    }

    /// Encode back into a BITS string, padded to whole bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; STATUS_BITS.len().div_ceil(8)];
        for flag in &self.0 {
            let bit = flag.bit();
            bytes[bit / 8] |= 0x80 >> (bit % 8);
        }
        bytes
    }
}

impl FromIterator<StatusFlag> for OutputStatus {
    fn from_iter<I: IntoIterator<Item = StatusFlag>>(iter: I) -> Self {
        let mut flags: Vec<StatusFlag> = iter.into_iter().collect();
        flags.sort_by_key(|flag| flag.bit());
        flags.dedup();
        OutputStatus(flags)
    }
}

impl core::fmt::Display for OutputStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}]", self.names().join(", "))
    }
}

/// Decode a raw BITS value. Unmapped bits are dropped and short input simply yields fewer flags.
pub fn decode_status(raw: &[u8]) -> OutputStatus {
    let flags = raw
        .iter()
        .enumerate()
        .flat_map(|(byte_idx, &byte)| {
            (0..8usize).filter_map(move |bit_idx| {
                if byte & (0x80u8 >> bit_idx) == 0 {
                    return None;
                }
                let position = byte_idx * 8 + bit_idx;
                STATUS_BITS.get(position).copied().flatten()
            })
        })
        .collect();
    OutputStatus(flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn all_zero_is_empty() {
        assert!(decode_status(&[0x00, 0x00, 0x00, 0x00]).is_empty());
        assert!(decode_status(&[]).is_empty());
    }

    #[test]
    fn single_bits() {
        assert_eq!(decode_status(&[0x80]).names(), vec!["outputOn"]);
        // bit 16 is the MSB of the third byte
        assert_eq!(
            decode_status(&[0x00, 0x00, 0x80, 0x00]).flags(),
            &[StatusFlag::OutputConstantVoltage]
        );
        assert_eq!(
            decode_status(&[0x00, 0x00, 0x40]).flags(),
            &[StatusFlag::OutputLowCurrentRange]
        );
    }

    #[test]
    fn reserved_and_trailing_bits_are_dropped() {
        // bit 8 is reserved, bits 26..32 are beyond the table
        assert!(decode_status(&[0x00, 0x80, 0x00, 0x3f]).is_empty());
        assert!(decode_status(&[0x00, 0x00, 0x00, 0x00, 0xff]).is_empty());
    }

    #[test]
    fn flags_come_out_in_bit_order() {
        let status = decode_status(&[0x80, 0x10, 0x80, 0x00]);
        assert_eq!(
            status.flags(),
            &[
                StatusFlag::OutputOn,
                StatusFlag::OutputRampUp,
                StatusFlag::OutputConstantVoltage
            ]
        );
        assert!(status.is_regulating());
        assert_eq!(
            status.to_string(),
            "[outputOn, outputRampUp, outputConstantVoltage]"
        );
    }

    #[test]
    fn every_flag_survives_bytes() {
        for flag in StatusFlag::iter() {
            let status = OutputStatus::from_iter([flag]);
            assert_eq!(decode_status(&status.to_bytes()).flags(), &[flag]);
        }
    }

    #[test]
    fn flag_names_match_mib() {
        assert_eq!(StatusFlag::OutputInitCrcCheckBad.to_string(), "outputInitCrcCheckBad");
        assert_eq!(StatusFlag::OutputFailureMaxSenseVoltage.bit(), 3);
        assert_eq!(StatusFlag::OutputFailureTimeout.bit(), 9);
    }

    #[test]
    fn bit_positions_agree_with_table() {
        for flag in StatusFlag::iter() {
            assert_eq!(STATUS_BITS[flag.bit()], Some(flag));
        }
        let mapped = STATUS_BITS.iter().flatten().count();
        assert_eq!(mapped, StatusFlag::iter().count());
        assert_eq!(STATUS_BITS[8], None);
    }
}
