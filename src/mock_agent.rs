//! We use this mocking module in unit tests to emulate the crate's SNMP agent and the passage of time.

use std::collections::{HashMap, VecDeque};

use fugit::MillisDurationU32;
use thiserror::Error;

use crate::{
    clock::Clock,
    codec::encode_float,
    registers::Command,
    status::{OutputStatus, StatusFlag},
    transport::{Operation, Request, Response, SnmpTransport, Value},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MockAgentError {
    /// Simulated request timeout
    #[error("request timed out")]
    Timeout,
    /// Simulated unreachable host
    #[error("host unreachable")]
    Unreachable,
}

enum Reply {
    Value(Value),
    Response(Response),
    Error(MockAgentError),
}

/// Our mock type used to emulate the agent on the crate controller.
///
/// Replies are scripted per command and consumed in order. Once a command's script runs out its sticky
/// value is returned instead, if any. Sets without a script echo the written value like a real agent.
#[derive(Default)]
pub struct MockAgent {
    /// Every request received, in order
    requests: Vec<Request>,
    /// Pending scripted replies per command
    scripted: HashMap<Command, VecDeque<Reply>>,
    /// Values returned once the script for a command is exhausted
    sticky: HashMap<Command, Value>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply carrying `value`.
    pub fn push_value(&mut self, command: Command, value: Value) -> &mut Self {
        self.queue(command).push_back(Reply::Value(value));
        self
    }

    /// Queue a complete response, e.g. one carrying an error status.
    pub fn push_response(&mut self, command: Command, response: Response) -> &mut Self {
        self.queue(command).push_back(Reply::Response(response));
        self
    }

    /// Queue a transport failure.
    pub fn push_error(&mut self, command: Command, error: MockAgentError) -> &mut Self {
        self.queue(command).push_back(Reply::Error(error));
        self
    }

    /// Value returned for `command` whenever nothing is scripted.
    pub fn set_value(&mut self, command: Command, value: Value) -> &mut Self {
        self.sticky.insert(command, value);
        self
    }

    /// Queue a measurement or setpoint reading.
    pub fn push_float(&mut self, command: Command, value: f32) -> &mut Self {
        self.push_value(command, float_value(value))
    }

    /// Queue an `outputStatus` reading.
    pub fn push_status(&mut self, flags: &[StatusFlag]) -> &mut Self {
        self.push_value(Command::OutputStatus, status_value(flags))
    }

    /// Get a reference to every request received so far
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Values written to `command`, in order.
    pub fn sets(&self, command: Command) -> Vec<&Value> {
        self.requests
            .iter()
            .filter(|request| request.object.command == command)
            .filter_map(|request| match &request.operation {
                Operation::Set(value) => Some(value),
                Operation::Get => None,
            })
            .collect()
    }

    /// Number of reads of `command`.
    pub fn gets(&self, command: Command) -> usize {
        self.requests
            .iter()
            .filter(|request| request.object.command == command)
            .filter(|request| request.operation == Operation::Get)
            .count()
    }

    fn queue(&mut self, command: Command) -> &mut VecDeque<Reply> {
        self.scripted.entry(command).or_default()
    }
}

impl SnmpTransport for MockAgent {
    type Error = MockAgentError;

    fn exchange(&mut self, request: &Request) -> Result<Response, Self::Error> {
        self.requests.push(request.clone());

        let command = request.object.command;
        let object = request.object.clone();
        let scripted = self
            .scripted
            .get_mut(&command)
            .and_then(|queue| queue.pop_front());

        match scripted {
            Some(Reply::Value(value)) => Ok(Response::with_value(object, value)),
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Error(error)) => Err(error),
            None => match (&request.operation, self.sticky.get(&command)) {
                (Operation::Set(value), _) => Ok(Response::with_value(object, value.clone())),
                (Operation::Get, Some(value)) => Ok(Response::with_value(object, value.clone())),
                (Operation::Get, None) => Ok(Response::default()),
            },
        }
    }
}

/// Records requested delays instead of waiting.
#[derive(Default)]
pub struct MockClock {
    slept: Vec<MillisDurationU32>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slept(&self) -> &[MillisDurationU32] {
        &self.slept
    }

    /// Sum of all delays, in milliseconds.
    pub fn total_ms(&self) -> u32 {
        self.slept.iter().map(|d| d.to_millis()).sum()
    }
}

impl Clock for MockClock {
    fn sleep(&mut self, duration: MillisDurationU32) {
        self.slept.push(duration);
    }
}

pub fn float_value(value: f32) -> Value {
    Value::Opaque(encode_float(value).to_vec())
}

pub fn status_value(flags: &[StatusFlag]) -> Value {
    let status: OutputStatus = flags.iter().copied().collect();
    Value::OctetString(status.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        address::Address,
        transport::{Endpoint, ObjectName},
        types::Authority,
    };

    fn request(command: Command, operation: Operation) -> Request {
        Request {
            endpoint: Endpoint {
                host: "localhost".into(),
                port: 161,
            },
            authority: Authority::Read,
            community: "public".into(),
            object: ObjectName {
                mib: "WIENER-CRATE-MIB".into(),
                command,
                address: Address::Output(0),
            },
            operation,
        }
    }

    #[test]
    fn scripted_replies_are_consumed_in_order() {
        let mut agent = MockAgent::new();
        agent
            .push_value(Command::OutputSwitch, Value::Integer(1))
            .push_error(Command::OutputSwitch, MockAgentError::Timeout);

        let get = request(Command::OutputSwitch, Operation::Get);
        let first = agent.exchange(&get).unwrap();
        assert_eq!(first.bindings[0].1, Value::Integer(1));
        assert_eq!(agent.exchange(&get), Err(MockAgentError::Timeout));
        assert!(agent.exchange(&get).unwrap().bindings.is_empty());
        assert_eq!(agent.gets(Command::OutputSwitch), 3);
    }

    #[test]
    fn sets_echo_and_are_recorded() {
        let mut agent = MockAgent::new();
        let set = request(Command::OutputVoltage, Operation::Set(float_value(12.0)));
        let response = agent.exchange(&set).unwrap();
        assert_eq!(response.bindings[0].1, float_value(12.0));
        assert_eq!(agent.sets(Command::OutputVoltage), vec![&float_value(12.0)]);
        assert!(agent.sets(Command::OutputSwitch).is_empty());
    }

    #[test]
    fn sticky_values_follow_the_script() {
        let mut agent = MockAgent::new();
        agent
            .set_value(Command::OutputMeasurementTerminalVoltage, float_value(5.0))
            .push_float(Command::OutputMeasurementTerminalVoltage, 1.0);

        let get = request(Command::OutputMeasurementTerminalVoltage, Operation::Get);
        assert_eq!(agent.exchange(&get).unwrap().bindings[0].1, float_value(1.0));
        assert_eq!(agent.exchange(&get).unwrap().bindings[0].1, float_value(5.0));
        assert_eq!(agent.exchange(&get).unwrap().bindings[0].1, float_value(5.0));
    }

    #[test]
    fn clock_records_delays() {
        let mut clock = MockClock::new();
        clock.sleep(MillisDurationU32::secs(5));
        clock.sleep(MillisDurationU32::millis(250));
        assert_eq!(clock.slept().len(), 2);
        assert_eq!(clock.total_ms(), 5250);
    }
}
