//! The boundary between this crate and whatever actually speaks SNMP on the network.
//!
//! A transport receives fully described [`Request`]s and hands back the decoded response PDU. Resolving the
//! symbolic [`ObjectName`] to a numeric OID, socket handling and timeouts all live behind this trait.

use crate::{address::Address, registers::Command, types::Authority};

/// Network location of the crate controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl core::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Fully qualified object instance, e.g. `WIENER-CRATE-MIB::outputVoltage.u100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectName {
    pub mib: String,
    pub command: Command,
    pub address: Address,
}

impl core::fmt::Display for ObjectName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}::{}.{}", self.mib, self.command, self.address)
    }
}

/// Values carried in variable bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// INTEGER and enumerations such as `outputSwitch`.
    Integer(i64),
    /// OCTET STRING, also used for BITS and display strings.
    OctetString(Vec<u8>),
    /// Contents of an `Opaque`, i.e. a vendor TLV without the outer wrapper.
    Opaque(Vec<u8>),
    Null,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::OctetString(_) => "OctetString",
            Value::Opaque(_) => "Opaque",
            Value::Null => "Null",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Get,
    Set(Value),
}

/// One request, to be answered by exactly one response.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub endpoint: Endpoint,
    pub authority: Authority,
    /// Community string matching `authority`.
    pub community: String,
    pub object: ObjectName,
    pub operation: Operation,
}

/// A decoded response PDU.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Response {
    /// SNMP error-status, `0` when the request succeeded.
    pub error_status: u32,
    /// 1-based index into `bindings` of the offending variable, `0` if none.
    pub error_index: u32,
    pub bindings: Vec<(ObjectName, Value)>,
}

impl Response {
    /// A successful response binding a single value.
    pub fn with_value(object: ObjectName, value: Value) -> Self {
        Self {
            error_status: 0,
            error_index: 0,
            bindings: vec![(object, value)],
        }
    }
}

/// Anything that can carry a request to the crate and return its response.
///
/// An `Err` means no usable response arrived: a timeout, an unreachable host or a malformed packet.
/// Error statuses reported by the agent itself are returned in the [`Response`].
pub trait SnmpTransport {
    type Error: core::fmt::Debug + core::fmt::Display;

    fn exchange(&mut self, request: &Request) -> Result<Response, Self::Error>;
}

impl<T: SnmpTransport + ?Sized> SnmpTransport for &mut T {
    type Error = T::Error;

    fn exchange(&mut self, request: &Request) -> Result<Response, Self::Error> {
        (**self).exchange(request)
    }
}
