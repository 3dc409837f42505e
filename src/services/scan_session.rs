//! Two-step putaway flow: scan the pallet LPN, then scan the rack location.
//!
//! A session can also start from a slot picked on the rack map, in which
//! case the location is pre-filled and scanning the LPN completes it.

use serde::Serialize;
use strum::Display;
use thiserror::Error;
use tracing::debug;

use crate::commands::assign_location_command::AssignLocationCommand;
use crate::errors::{AssignmentError, TopologyError};
use crate::location_code::LocationCode;
use crate::lpn::Lpn;
use crate::models::rack::SlotStatus;
use crate::repositories::inventory::InventoryStore;
use crate::repositories::topology::TopologyStore;
use crate::services::putaway::PutawayResolver;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ScanStep {
    AwaitingLpn,
    AwaitingLocation,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error("Unexpected scan; the session is {expected}")]
    OutOfSequence { expected: ScanStep },
}

/// What the operator should do after a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// LPN accepted; scan a location next.
    AwaitingLocation { lpn: Lpn },
    /// Both halves validated. The caller applies the command.
    Ready(AssignLocationCommand),
}

/// Result of picking a slot on the rack map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotSelection {
    /// Empty slot; its code is pre-filled and the session awaits an LPN.
    Prefilled(LocationCode),
    /// The slot already holds this pallet; nothing was pre-filled.
    Occupied(Lpn),
}

#[derive(Debug, Clone)]
pub struct ScanSession {
    step: ScanStep,
    lpn: Option<Lpn>,
    location: Option<String>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            step: ScanStep::AwaitingLpn,
            lpn: None,
            location: None,
        }
    }

    pub fn step(&self) -> ScanStep {
        self.step
    }

    pub fn lpn(&self) -> Option<&Lpn> {
        self.lpn.as_ref()
    }

    pub fn prefilled_location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Returns to the LPN step, discarding any held LPN or location.
    pub fn cancel(&mut self) {
        *self = Self::new();
    }

    /// Picks a slot on the rack map.
    pub fn select_slot(
        &mut self,
        topology: &TopologyStore,
        inventory: &InventoryStore,
        rack_id: u32,
        level: u32,
        position: u32,
    ) -> Result<SlotSelection, ScanError> {
        let code = topology.label_for_slot(rack_id, level, position)?;
        let rack = topology
            .rack(rack_id)
            .ok_or(TopologyError::RackNotFound(rack_id))?;

        match topology.slot_status(rack, level, position, inventory) {
            SlotStatus::Blocked => Err(AssignmentError::SlotBlocked {
                code: code.to_string(),
            }
            .into()),
            SlotStatus::Occupied(lpn) => Ok(SlotSelection::Occupied(lpn)),
            SlotStatus::Empty => {
                self.step = ScanStep::AwaitingLpn;
                self.lpn = None;
                self.location = Some(code.to_string());
                debug!(code = %code, "Slot selected for putaway");
                Ok(SlotSelection::Prefilled(code))
            }
        }
    }

    /// Handles an LPN scan.
    ///
    /// An unknown or already shelved LPN leaves the session waiting for
    /// another LPN. With a pre-filled location the assignment is resolved
    /// right away; if that fails the LPN is kept and the session waits for a
    /// location scan instead.
    pub fn scan_lpn(
        &mut self,
        topology: &TopologyStore,
        inventory: &InventoryStore,
        raw: &str,
    ) -> Result<ScanOutcome, ScanError> {
        if self.step != ScanStep::AwaitingLpn {
            return Err(ScanError::OutOfSequence {
                expected: self.step,
            });
        }

        let resolver = PutawayResolver::new(topology, inventory);
        let lpn = resolver.check_pending(raw)?;

        match self.location.take() {
            Some(code) => match resolver.resolve(&code, lpn.as_str()) {
                Ok(command) => {
                    self.cancel();
                    Ok(ScanOutcome::Ready(command))
                }
                Err(err) => {
                    self.step = ScanStep::AwaitingLocation;
                    self.lpn = Some(lpn);
                    Err(err.into())
                }
            },
            None => {
                self.step = ScanStep::AwaitingLocation;
                self.lpn = Some(lpn.clone());
                Ok(ScanOutcome::AwaitingLocation { lpn })
            }
        }
    }

    /// Handles a location scan for the held LPN. On failure the LPN is kept
    /// so the operator only rescans the location.
    pub fn scan_location(
        &mut self,
        topology: &TopologyStore,
        inventory: &InventoryStore,
        raw: &str,
    ) -> Result<AssignLocationCommand, ScanError> {
        let lpn = match (&self.step, &self.lpn) {
            (ScanStep::AwaitingLocation, Some(lpn)) => lpn.clone(),
            _ => {
                return Err(ScanError::OutOfSequence {
                    expected: self.step,
                })
            }
        };

        let command = PutawayResolver::new(topology, inventory).resolve(raw, lpn.as_str())?;
        self.cancel();
        Ok(command)
    }
}
