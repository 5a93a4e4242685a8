use serde::{Deserialize, Serialize};
use crate::address::Tag;
use crate::protocol::CoherenceState;

/// Number of lines in an L1 set
pub const WAYS: usize = 2;

/// A single cache line: a tag, its coherence state, and whether it was used most recently
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Line {
    pub tag: Tag,
    pub state: CoherenceState,
    pub recent: bool,
}

/// How many lines are in each MESI state. Useful for debugging and checking invariants
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StateCensus {
    pub modified: u64,
    pub exclusive: u64,
    pub shared: u64,
    pub invalid: u64,
}

impl StateCensus {
    pub fn count(&mut self, state: CoherenceState) {
        match state {
            CoherenceState::Modified => self.modified += 1,
            CoherenceState::Exclusive => self.exclusive += 1,
            CoherenceState::Shared => self.shared += 1,
            CoherenceState::Invalid => self.invalid += 1,
        }
    }

    pub fn merge(&mut self, other: &StateCensus) {
        self.modified += other.modified;
        self.exclusive += other.exclusive;
        self.shared += other.shared;
        self.invalid += other.invalid;
    }
}

/// A 2-way set with strict LRU replacement
///
/// Each line carries a recency bit. Using a line sets its bit and clears the other one, so the
/// line with a clear bit is always the victim. Both bits start clear, and the first fill goes to
/// the first line
///
/// Only valid lines take part in lookups. An invalidated line keeps its tag but can never be
/// found again, it just waits to be replaced
#[derive(Debug, Clone, Default)]
pub struct SetLru {
    lines: [Line; WAYS],
}

impl SetLru {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, tag: Tag) -> Option<usize> {
        self.lines.iter().position(|line| line.state.is_valid() && line.tag == tag)
    }

    fn touch_line(&mut self, way: usize) {
        for (n, line) in self.lines.iter_mut().enumerate() {
            line.recent = n == way;
        }
    }

    /// Gets the state of the line holding `tag`, Invalid if no line does
    pub fn lookup(&self, tag: Tag) -> CoherenceState {
        self.find(tag).map_or(CoherenceState::Invalid, |way| self.lines[way].state)
    }

    /// Marks the line holding `tag` as most recently used, if there is one
    pub fn touch(&mut self, tag: Tag) {
        if let Some(way) = self.find(tag) {
            self.touch_line(way);
        }
    }

    /// Updates the state of the line holding `tag`. Does nothing if no line does
    pub fn set_state(&mut self, tag: Tag, state: CoherenceState) {
        if let Some(way) = self.find(tag) {
            self.lines[way].state = state;
        }
    }

    /// Places `tag` in the least recently used line and marks it most recently used
    ///
    /// Whatever the victim held is overwritten, dirty or not. There is no write-back
    ///
    /// # Arguments
    ///
    /// * `tag`: The tag of the incoming block
    /// * `state`: The state it is installed in
    ///
    /// returns: The line that was replaced
    pub fn insert(&mut self, tag: Tag, state: CoherenceState) -> Line {
        let way = self.lines.iter().position(|line| !line.recent).unwrap_or(0);
        let victim = self.lines[way];
        self.lines[way] = Line { tag, state, recent: false };
        self.touch_line(way);
        victim
    }

    pub fn census(&self) -> StateCensus {
        let mut census = StateCensus::default();
        self.lines.iter().for_each(|line| census.count(line.state));
        census
    }
}
