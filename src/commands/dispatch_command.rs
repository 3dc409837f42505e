use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::{commands::Command, errors::ServiceError, lpn::Lpn, warehouse::Warehouse};

/// Removes pallets from the active set (shipped, sold or cross-docked).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatchCommand {
    #[validate(length(min = 1))]
    pub lpns: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchResult {
    pub dispatched: Vec<Lpn>,
    pub missing: Vec<String>,
}

impl Command for DispatchCommand {
    type Result = DispatchResult;

    #[instrument(skip(self, warehouse), fields(count = self.lpns.len()))]
    fn execute(&self, warehouse: &mut Warehouse) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let dispatched: Vec<Lpn> = warehouse
            .inventory
            .dispatch_many(self.lpns.as_slice())
            .into_iter()
            .map(|item| item.lpn)
            .collect();
        let missing = self
            .lpns
            .iter()
            .map(|raw| raw.trim())
            .filter(|lpn| !dispatched.iter().any(|d| d.as_str() == *lpn))
            .map(str::to_string)
            .collect();
        let result = DispatchResult { dispatched, missing };
        info!(
            dispatched = result.dispatched.len(),
            missing = result.missing.len(),
            "Dispatch completed"
        );
        Ok(result)
    }
}
