use crate::{errors::ServiceError, warehouse::Warehouse};

/// Command trait for implementing the Command Pattern
///
/// A command encapsulates one business operation: it validates its own
/// input, mutates the warehouse through the stores, and reports a result.
/// Commands run to completion synchronously; a failed command leaves the
/// warehouse unchanged.
pub trait Command {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command against the given warehouse state
    fn execute(&self, warehouse: &mut Warehouse) -> Result<Self::Result, ServiceError>;
}

pub mod assign_location_command;
pub mod dispatch_command;
pub mod receive_pallet_command;

pub use assign_location_command::AssignLocationCommand;
pub use dispatch_command::{DispatchCommand, DispatchResult};
pub use receive_pallet_command::{ReceivePalletCommand, ReceivePalletResult};
