//! Splitter component model.

use pt_core::{LineId, Volume};

/// Passive fan-out that divides received volume equally over its outputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Splitter {
    /// Output lines (non-owning).
    pub outputs: Vec<LineId>,
    dropped_total: Volume,
}

/// Result of dividing an amount across a splitter's outputs.
#[derive(Clone, Debug, PartialEq)]
pub struct Division {
    pub shares: Vec<(LineId, Volume)>,
    /// Volume that had nowhere to go.
    pub dropped: Volume,
}

impl Splitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `amount` into `amount / n` per output line.
    ///
    /// With no outputs the whole amount is dropped and recorded.
    pub fn divide(&mut self, amount: Volume) -> Division {
        if self.outputs.is_empty() {
            self.dropped_total += amount;
            return Division {
                shares: Vec::new(),
                dropped: amount,
            };
        }
        let share = amount / self.outputs.len() as Volume;
        Division {
            shares: self.outputs.iter().map(|&line| (line, share)).collect(),
            dropped: 0.0,
        }
    }

    pub fn has_outputs(&self) -> bool {
        !self.outputs.is_empty()
    }

    /// Total volume dropped over the splitter's lifetime.
    pub fn dropped_total(&self) -> Volume {
        self.dropped_total
    }

    /// Status payload: `ok`, or `no_outputs` for a splitter that drops.
    pub fn status(&self) -> &'static str {
        if self.has_outputs() { "ok" } else { "no_outputs" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divides_equally() {
        let mut s = Splitter::new();
        s.outputs = (0..3).map(LineId::from_index).collect();
        let d = s.divide(90.0);
        assert_eq!(d.dropped, 0.0);
        assert_eq!(d.shares.len(), 3);
        assert!(d.shares.iter().all(|&(_, v)| v == 30.0));
        assert_eq!(s.status(), "ok");
    }

    #[test]
    fn no_outputs_drops_and_records() {
        let mut s = Splitter::new();
        let d = s.divide(12.0);
        assert!(d.shares.is_empty());
        assert_eq!(d.dropped, 12.0);
        s.divide(3.0);
        assert_eq!(s.dropped_total(), 15.0);
        assert_eq!(s.status(), "no_outputs");
    }
}
