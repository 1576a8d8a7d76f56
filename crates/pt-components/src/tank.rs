//! Tank component model.

use pt_core::{Volume, ensure_non_negative};

use crate::error::{ComponentError, ComponentResult};

/// Bounded-capacity reservoir.
///
/// Invariant: `0 <= current_volume <= max_capacity` after every public
/// operation. Anything that would break the upper bound is clamped and the
/// excess is accounted as overflow, never silently discarded.
#[derive(Clone, Debug, PartialEq)]
pub struct Tank {
    max_capacity: Volume,
    current_volume: Volume,
    /// Overflow accumulated since the last [`Tank::take_overflow`].
    pending_overflow: Volume,
}

/// Outcome of an external volume overwrite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeOverride {
    pub requested: Volume,
    pub applied: Volume,
}

impl VolumeOverride {
    pub fn was_clamped(&self) -> bool {
        self.requested != self.applied
    }
}

impl Tank {
    /// Create a tank.
    ///
    /// # Errors
    /// Returns error if either value is negative or non-finite, or if the
    /// initial volume exceeds the capacity.
    pub fn new(max_capacity: Volume, initial_volume: Volume) -> ComponentResult<Self> {
        let max_capacity = ensure_non_negative(max_capacity, "max_capacity")?;
        let current_volume = ensure_non_negative(initial_volume, "initial_volume")?;
        if current_volume > max_capacity {
            return Err(ComponentError::InitialExceedsCapacity {
                initial: current_volume,
                max_capacity,
            });
        }
        Ok(Self {
            max_capacity,
            current_volume,
            pending_overflow: 0.0,
        })
    }

    pub fn max_capacity(&self) -> Volume {
        self.max_capacity
    }

    pub fn current_volume(&self) -> Volume {
        self.current_volume
    }

    /// Free capacity left before overflowing.
    pub fn headroom(&self) -> Volume {
        (self.max_capacity - self.current_volume).max(0.0)
    }

    /// Add `amount` and return the overflow (`>= 0`).
    ///
    /// The volume is clamped to `max_capacity`; the excess is returned and also
    /// accumulated for publication.
    pub fn receive(&mut self, amount: Volume) -> ComponentResult<Volume> {
        let amount = ensure_non_negative(amount, "received amount")?;
        let total = self.current_volume + amount;
        let overflow = (total - self.max_capacity).max(0.0);
        self.current_volume = total.min(self.max_capacity);
        self.pending_overflow += overflow;
        Ok(overflow)
    }

    /// Remove up to `amount`, returning what was actually removed.
    pub fn withdraw(&mut self, amount: Volume) -> Volume {
        let taken = amount.max(0.0).min(self.current_volume);
        self.current_volume -= taken;
        taken
    }

    /// Change the capacity bound, returning any volume spilled as overflow.
    pub fn set_max_capacity(&mut self, max_capacity: Volume) -> ComponentResult<Volume> {
        let max_capacity = ensure_non_negative(max_capacity, "max_capacity")?;
        let spilled = (self.current_volume - max_capacity).max(0.0);
        self.max_capacity = max_capacity;
        self.current_volume -= spilled;
        self.pending_overflow += spilled;
        Ok(spilled)
    }

    /// Overwrite the volume from outside the simulation.
    ///
    /// The value is clamped into `[0, max_capacity]`; no overflow is recorded
    /// since the volume did not arrive through a line.
    pub fn override_volume(&mut self, requested: Volume) -> ComponentResult<VolumeOverride> {
        if !requested.is_finite() {
            return Err(ComponentError::NonFinite {
                what: "volume override",
                value: requested,
            });
        }
        let applied = requested.clamp(0.0, self.max_capacity);
        self.current_volume = applied;
        Ok(VolumeOverride { requested, applied })
    }

    pub fn pending_overflow(&self) -> Volume {
        self.pending_overflow
    }

    /// Return and reset the accumulated overflow.
    pub fn take_overflow(&mut self) -> Volume {
        std::mem::take(&mut self.pending_overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_bad_values() {
        assert!(matches!(
            Tank::new(-1.0, 0.0),
            Err(ComponentError::Negative { .. })
        ));
        assert!(matches!(
            Tank::new(10.0, f64::NAN),
            Err(ComponentError::NonFinite { .. })
        ));
        assert!(matches!(
            Tank::new(10.0, 11.0),
            Err(ComponentError::InitialExceedsCapacity { .. })
        ));
    }

    #[test]
    fn receive_within_capacity() {
        let mut tank = Tank::new(500.0, 0.0).unwrap();
        assert_eq!(tank.receive(200.0).unwrap(), 0.0);
        assert_eq!(tank.current_volume(), 200.0);
        assert_eq!(tank.headroom(), 300.0);
        assert_eq!(tank.pending_overflow(), 0.0);
    }

    #[test]
    fn receive_clamps_and_reports_overflow() {
        let mut tank = Tank::new(100.0, 0.0).unwrap();
        assert_eq!(tank.receive(200.0).unwrap(), 100.0);
        assert_eq!(tank.current_volume(), 100.0);
        assert_eq!(tank.take_overflow(), 100.0);
        assert_eq!(tank.take_overflow(), 0.0);
    }

    #[test]
    fn receive_rejects_negative_amount() {
        let mut tank = Tank::new(100.0, 50.0).unwrap();
        assert!(tank.receive(-5.0).is_err());
        assert_eq!(tank.current_volume(), 50.0);
    }

    #[test]
    fn withdraw_never_goes_negative() {
        let mut tank = Tank::new(100.0, 30.0).unwrap();
        assert_eq!(tank.withdraw(50.0), 30.0);
        assert_eq!(tank.current_volume(), 0.0);
        assert_eq!(tank.withdraw(-3.0), 0.0);
    }

    #[test]
    fn lowering_capacity_spills() {
        let mut tank = Tank::new(100.0, 80.0).unwrap();
        assert_eq!(tank.set_max_capacity(50.0).unwrap(), 30.0);
        assert_eq!(tank.current_volume(), 50.0);
        assert_eq!(tank.pending_overflow(), 30.0);
        assert_eq!(tank.set_max_capacity(200.0).unwrap(), 0.0);
    }

    #[test]
    fn override_is_clamped() {
        let mut tank = Tank::new(100.0, 10.0).unwrap();
        let o = tank.override_volume(250.0).unwrap();
        assert!(o.was_clamped());
        assert_eq!(tank.current_volume(), 100.0);

        let o = tank.override_volume(-4.0).unwrap();
        assert_eq!(o.applied, 0.0);

        let o = tank.override_volume(42.0).unwrap();
        assert!(!o.was_clamped());
        assert_eq!(tank.current_volume(), 42.0);
        assert!(tank.override_volume(f64::INFINITY).is_err());
    }
}
