//! Line (edge) model.

use pt_core::{CompId, Volume};

/// Buffered edge between two components.
///
/// Holds at most one tick's transfer; the graph drains every buffer before a
/// tick ends.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub id: String,
    pub source: CompId,
    pub target: CompId,
    buffer: Volume,
}

impl Line {
    pub fn new(id: impl Into<String>, source: CompId, target: CompId) -> Self {
        Self {
            id: id.into(),
            source,
            target,
            buffer: 0.0,
        }
    }

    pub fn buffer(&self) -> Volume {
        self.buffer
    }

    pub fn fill(&mut self, amount: Volume) {
        self.buffer += amount;
    }

    /// Take the buffered volume, leaving the line empty.
    pub fn drain(&mut self) -> Volume {
        std::mem::take(&mut self.buffer)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_then_drain() {
        let mut line = Line::new("l1", CompId::from_index(0), CompId::from_index(1));
        assert!(line.is_empty());
        line.fill(5.0);
        line.fill(2.5);
        assert_eq!(line.buffer(), 7.5);
        assert_eq!(line.drain(), 7.5);
        assert!(line.is_empty());
    }
}
