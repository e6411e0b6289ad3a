//! The lifecycle contract shared by every background service.
//!
//! All three operations must be callable in any order, any number of times:
//! `destroy` on a service that was never deployed is a successful no-op.

use async_trait::async_trait;
use fleetcap_common::executor::PlayReport;

#[async_trait]
pub trait Service: Send + Sync {
    /// Starts the service on every host. With `force`, everything this
    /// instance may have started before is torn down first.
    async fn deploy(&self, force: bool) -> anyhow::Result<PlayReport>;

    /// Retrieves the artifacts produced so far, without stopping anything.
    async fn backup(&self) -> anyhow::Result<PlayReport>;

    /// Stops every remote activity of this instance.
    async fn destroy(&self) -> anyhow::Result<PlayReport>;
}
