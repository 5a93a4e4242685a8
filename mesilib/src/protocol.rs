use serde::{Deserialize, Serialize};
use crate::address::Address;

/// The MESI state of a block in one L1
///
/// At most one L1 may hold a block as Modified or Exclusive, and never while the other holds it
/// at all. Both may hold it as Shared
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CoherenceState {
    Invalid,
    Shared,
    Exclusive,
    Modified,
}

impl CoherenceState {
    /// True for every state except Invalid
    pub fn is_valid(self) -> bool {
        self != CoherenceState::Invalid
    }

    /// True for Modified and Exclusive, the states only one L1 may hold
    pub fn is_owned(self) -> bool {
        matches!(self, CoherenceState::Modified | CoherenceState::Exclusive)
    }
}

impl Default for CoherenceState {
    fn default() -> Self {
        CoherenceState::Invalid
    }
}

/// The kind of a memory request
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Op {
    Read,
    Write,
}

/// A single request from a trace
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Request {
    pub op: Op,
    pub address: Address,
}

impl Request {
    pub fn read(address: Address) -> Self {
        Self { op: Op::Read, address }
    }

    pub fn write(address: Address) -> Self {
        Self { op: Op::Write, address }
    }
}

/// The snoop channel, the only operations one L1 performs on the other
///
/// The controller handling a request receives its sibling through this trait, so neither
/// controller needs to own or point at the other
pub trait Snoop {
    /// Gets the state of the block containing `address`, Invalid if it isn't held
    fn state(&self, address: &Address) -> CoherenceState;

    /// Changes the state of a block the snooped cache is known to hold
    ///
    /// Does nothing if the block isn't held
    fn change_state(&mut self, address: &Address, state: CoherenceState);

    /// Forces the block containing `address` to Invalid
    fn invalidate(&mut self, address: &Address) {
        self.change_state(address, CoherenceState::Invalid)
    }
}
