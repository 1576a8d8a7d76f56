//! Register file and device-to-register binding.

use std::collections::HashMap;

pub use pt_core::DEFAULT_REGISTER_COUNT;
use pt_core::{Real, RegisterAddr};

use crate::error::{ControlError, ControlResult};

/// Bijective mapping between device ids and register addresses.
///
/// Both directions are hashed, so resolving a register during rule evaluation
/// is constant time. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterMap {
    order: Vec<(String, RegisterAddr)>,
    by_device: HashMap<String, RegisterAddr>,
    by_register: HashMap<RegisterAddr, String>,
}

impl RegisterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `device` to `address`.
    ///
    /// # Errors
    /// Fails if either side is already bound.
    pub fn insert(&mut self, device: &str, address: RegisterAddr) -> ControlResult<()> {
        if let Some(&existing) = self.by_device.get(device) {
            return Err(ControlError::DuplicateDevice {
                device: device.to_string(),
                address: existing,
            });
        }
        if let Some(existing) = self.by_register.get(&address) {
            return Err(ControlError::DuplicateRegister {
                address,
                device: existing.clone(),
            });
        }
        self.by_device.insert(device.to_string(), address);
        self.by_register.insert(address, device.to_string());
        self.order.push((device.to_string(), address));
        Ok(())
    }

    pub fn device_at(&self, address: RegisterAddr) -> Option<&str> {
        self.by_register.get(&address).map(String::as_str)
    }

    pub fn register_of(&self, device: &str) -> Option<RegisterAddr> {
        self.by_device.get(device).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, RegisterAddr)> + '_ {
        self.order.iter().map(|(d, a)| (d.as_str(), *a))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Highest bound address.
    pub fn max_address(&self) -> Option<RegisterAddr> {
        self.order.iter().map(|(_, a)| *a).max()
    }
}

/// Fixed-size array of externally addressable scalar registers.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterBank {
    slots: Vec<Real>,
}

impl RegisterBank {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![0.0; size],
        }
    }

    pub fn read(&self, address: RegisterAddr) -> ControlResult<Real> {
        self.slots
            .get(address as usize)
            .copied()
            .ok_or(ControlError::RegisterOutOfRange {
                address,
                size: self.slots.len(),
            })
    }

    pub fn write(&mut self, address: RegisterAddr, value: Real) -> ControlResult<()> {
        let size = self.slots.len();
        let slot = self
            .slots
            .get_mut(address as usize)
            .ok_or(ControlError::RegisterOutOfRange { address, size })?;
        *slot = value;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn as_slice(&self) -> &[Real] {
        &self.slots
    }
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTER_COUNT)
    }
}
