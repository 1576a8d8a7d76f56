//! Inbound commands from the `set/...` topic namespace.

use serde::{Deserialize, Serialize};

use crate::error::{BusError, BusResult};
use crate::topics;

/// Requested pump state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PumpState {
    Open,
    Closed,
}

impl PumpState {
    pub fn is_open(self) -> bool {
        matches!(self, PumpState::Open)
    }

    /// Wire payload for this state.
    pub fn as_payload(self) -> &'static str {
        match self {
            PumpState::Open => "open",
            PumpState::Closed => "closed",
        }
    }

    pub fn from_open(open: bool) -> Self {
        if open { PumpState::Open } else { PumpState::Closed }
    }
}

/// A typed remote command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    SetPumpRate { pump: String, rate: f64 },
    SetPumpState { pump: String, state: PumpState },
    SetTankMaxCapacity { tank: String, capacity: f64 },
}

impl Command {
    /// Parse a command from its topic and plain-text payload.
    pub fn parse(topic: &str, payload: &str) -> BusResult<Self> {
        let unknown = || BusError::UnknownTopic {
            topic: topic.to_string(),
        };
        let (is_command, kind, id, field) = topics::split(topic).ok_or_else(unknown)?;
        if !is_command {
            return Err(unknown());
        }

        match (kind, field) {
            ("pump", "rate") => Ok(Command::SetPumpRate {
                pump: id.to_string(),
                rate: parse_quantity(topic, payload)?,
            }),
            ("pump", "state") => {
                let state = match payload.trim().to_ascii_lowercase().as_str() {
                    "open" => PumpState::Open,
                    "closed" => PumpState::Closed,
                    _ => {
                        return Err(BusError::MalformedPayload {
                            topic: topic.to_string(),
                            payload: payload.to_string(),
                            reason: "expected 'open' or 'closed'",
                        });
                    }
                };
                Ok(Command::SetPumpState {
                    pump: id.to_string(),
                    state,
                })
            }
            ("tank", "max_capacity") => Ok(Command::SetTankMaxCapacity {
                tank: id.to_string(),
                capacity: parse_quantity(topic, payload)?,
            }),
            _ => Err(unknown()),
        }
    }

    /// The command topic this command is delivered on.
    pub fn topic(&self) -> String {
        match self {
            Command::SetPumpRate { pump, .. } => topics::set_pump_rate(pump),
            Command::SetPumpState { pump, .. } => topics::set_pump_state(pump),
            Command::SetTankMaxCapacity { tank, .. } => topics::set_tank_max_capacity(tank),
        }
    }

    /// Id of the component the command addresses.
    pub fn target(&self) -> &str {
        match self {
            Command::SetPumpRate { pump, .. } | Command::SetPumpState { pump, .. } => pump,
            Command::SetTankMaxCapacity { tank, .. } => tank,
        }
    }
}

fn parse_quantity(topic: &str, payload: &str) -> BusResult<f64> {
    let malformed = |reason| BusError::MalformedPayload {
        topic: topic.to_string(),
        payload: payload.to_string(),
        reason,
    };
    let value: f64 = payload
        .trim()
        .parse()
        .map_err(|_| malformed("not a number"))?;
    if !value.is_finite() {
        return Err(malformed("not finite"));
    }
    if value < 0.0 {
        return Err(malformed("negative"));
    }
    Ok(value)
}
