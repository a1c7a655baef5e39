//! Pending slot - at-most-one holding area between arrival and the consumer's pull
//!
//! The slot itself is a plain value; [`crate::GpxHandoff`] owns it behind its
//! handler mutex, which is the only place it is mutated.

use crate::loader::GpxPayload;
use crate::reference::ResourceReference;

/// What is waiting for the consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    /// Accepted but not read yet; the pull reads it
    Reference(ResourceReference),
    /// Already read
    Content(GpxPayload),
    /// Read on arrival failed; the pull reports it once
    Unreadable {
        reference: ResourceReference,
        reason: String,
    },
}

/// Slot lifecycle. `Delivered` behaves like `Empty` for the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SlotState {
    #[default]
    Empty,
    Holding(Pending),
    Delivered,
}

/// Single-occupancy cell
#[derive(Debug, Default)]
pub struct PendingSlot {
    state: SlotState,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SlotState {
        &self.state
    }

    pub fn is_holding(&self) -> bool {
        matches!(self.state, SlotState::Holding(_))
    }

    /// Hold `pending`, returning whatever it displaced
    pub fn hold(&mut self, pending: Pending) -> Option<Pending> {
        Self::displaced(std::mem::replace(
            &mut self.state,
            SlotState::Holding(pending),
        ))
    }

    /// Hand the held item out. Never returns the same item twice.
    pub fn take(&mut self) -> Option<Pending> {
        match std::mem::take(&mut self.state) {
            SlotState::Holding(pending) => {
                self.state = SlotState::Delivered;
                Some(pending)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Record a delivery that bypassed the slot, returning whatever it displaced
    pub fn mark_delivered(&mut self) -> Option<Pending> {
        Self::displaced(std::mem::replace(&mut self.state, SlotState::Delivered))
    }

    fn displaced(previous: SlotState) -> Option<Pending> {
        match previous {
            SlotState::Holding(pending) => Some(pending),
            SlotState::Empty | SlotState::Delivered => None,
        }
    }
}
