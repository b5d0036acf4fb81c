//! The async boundary between the linter core and live chain data.

use async_trait::async_trait;

use crate::errors::DataUnavailableError;
use crate::fact::{ChainId, FactModel, Timestamp};

/// A service that assembles fact snapshots from external sources.
///
/// Implementations typically sit on RPC endpoints, indexers or archive
/// nodes; the linter core itself performs no I/O and treats whatever this
/// trait returns as the complete truth about the deployment. Failures
/// propagate to the caller unchanged. The core never retries, backs off or
/// caches on the provider's behalf.
#[async_trait]
pub trait FactProvider: Send + Sync + 'static {
    /// Produces a well-formed snapshot of `chain_id` as observed at
    /// `at_time`.
    ///
    /// The returned model's `observed_at` may be earlier than `at_time`
    /// (providers serve the freshest snapshot at or before the requested
    /// time) but never later.
    async fn fetch_fact_model(
        &self,
        chain_id: ChainId,
        at_time: Timestamp,
    ) -> Result<FactModel, DataUnavailableError>;
}
