//! Pump component model.

use pt_core::{CompId, LineId, Volume, ensure_non_negative};

use crate::error::ComponentResult;

/// Rate-limited, open/closable transfer unit.
///
/// A pump draws from its `source` tank and pushes into its `outlet` line, whose
/// target is the pump's target component. Both links are resolved by the graph
/// builder after all components exist.
#[derive(Clone, Debug, PartialEq)]
pub struct Pump {
    rate: Volume,
    is_open: bool,
    /// Component drawn from (non-owning).
    pub source: Option<CompId>,
    /// Line carrying the pumped volume (non-owning).
    pub outlet: Option<LineId>,
}

impl Pump {
    /// # Errors
    /// Returns error if `rate` is negative or non-finite.
    pub fn new(rate: Volume, is_open: bool) -> ComponentResult<Self> {
        Ok(Self {
            rate: ensure_non_negative(rate, "pump rate")?,
            is_open,
            source: None,
            outlet: None,
        })
    }

    /// Volume per tick moved while open.
    pub fn rate(&self) -> Volume {
        self.rate
    }

    pub fn set_rate(&mut self, rate: Volume) -> ComponentResult<()> {
        self.rate = ensure_non_negative(rate, "pump rate")?;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Volume this pump asks for this tick.
    pub fn requested(&self) -> Volume {
        if self.is_open { self.rate } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_pump_requests_nothing() {
        let mut pump = Pump::new(200.0, true).unwrap();
        assert_eq!(pump.requested(), 200.0);
        pump.close();
        assert_eq!(pump.requested(), 0.0);
        pump.open();
        assert!(pump.is_open());
    }

    #[test]
    fn rate_must_be_non_negative() {
        assert!(Pump::new(-1.0, false).is_err());
        let mut pump = Pump::new(1.0, false).unwrap();
        assert!(pump.set_rate(f64::NAN).is_err());
        assert_eq!(pump.rate(), 1.0);
        pump.set_rate(0.0).unwrap();
        assert_eq!(pump.rate(), 0.0);
    }
}
