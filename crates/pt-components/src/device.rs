//! Device sum type: the only polymorphism point over component kinds.

use pt_core::{Real, Volume};

use crate::error::{ComponentError, ComponentResult};
use crate::pump::Pump;
use crate::splitter::Splitter;
use crate::tank::{Tank, VolumeOverride};

/// A component's physical behaviour.
#[derive(Clone, Debug, PartialEq)]
pub enum Device {
    Tank(Tank),
    Pump(Pump),
    Splitter(Splitter),
}

/// Discriminant of [`Device`], for diagnostics and topic names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Tank,
    Pump,
    Splitter,
}

impl DeviceKind {
    /// Lower-case name used in topics and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceKind::Tank => "tank",
            DeviceKind::Pump => "pump",
            DeviceKind::Splitter => "splitter",
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an external register write did to a device.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RegisterOverride {
    PumpState { open: bool },
    TankVolume(VolumeOverride),
}

impl Device {
    pub fn kind(&self) -> DeviceKind {
        match self {
            Device::Tank(_) => DeviceKind::Tank,
            Device::Pump(_) => DeviceKind::Pump,
            Device::Splitter(_) => DeviceKind::Splitter,
        }
    }

    /// Canonical scalar exposed to registers and rule conditions.
    ///
    /// Tanks report their volume, pumps `1.0`/`0.0` for open/closed, and
    /// stateless devices `0.0`.
    pub fn value(&self) -> Real {
        match self {
            Device::Tank(t) => t.current_volume(),
            Device::Pump(p) => {
                if p.is_open() {
                    1.0
                } else {
                    0.0
                }
            }
            Device::Splitter(_) => 0.0,
        }
    }

    /// Open or close the device.
    ///
    /// Only pumps carry an open/closed state.
    pub fn set_open(&mut self, open: bool) -> ComponentResult<()> {
        match self {
            Device::Pump(p) => {
                p.set_open(open);
                Ok(())
            }
            other => Err(ComponentError::NotSupported {
                what: if open { "open" } else { "close" },
                kind: other.kind().as_str(),
            }),
        }
    }

    /// Apply an external register value.
    ///
    /// Pumps interpret `1` as open and anything else as closed; tanks take the
    /// value as their new volume. Splitters expose nothing writable.
    pub fn apply_register(&mut self, value: Real) -> ComponentResult<RegisterOverride> {
        match self {
            Device::Pump(p) => {
                let open = value == 1.0;
                p.set_open(open);
                Ok(RegisterOverride::PumpState { open })
            }
            Device::Tank(t) => Ok(RegisterOverride::TankVolume(t.override_volume(value)?)),
            Device::Splitter(_) => Err(ComponentError::NotSupported {
                what: "register override",
                kind: "splitter",
            }),
        }
    }

    pub fn as_tank(&self) -> Option<&Tank> {
        match self {
            Device::Tank(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_tank_mut(&mut self) -> Option<&mut Tank> {
        match self {
            Device::Tank(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_pump(&self) -> Option<&Pump> {
        match self {
            Device::Pump(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_pump_mut(&mut self) -> Option<&mut Pump> {
        match self {
            Device::Pump(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_splitter(&self) -> Option<&Splitter> {
        match self {
            Device::Splitter(s) => Some(s),
            _ => None,
        }
    }

    /// Volume held by the device, if it stores any.
    pub fn stored_volume(&self) -> Volume {
        self.as_tank().map_or(0.0, Tank::current_volume)
    }
}
