//! Abstraction over where the dashboard gets its readings from.
//!
//! [`StationClient`](crate::StationClient) is the production source; tests
//! drive the poller with [`MockSource`](crate::mock::MockSource).

use async_trait::async_trait;

use weatherverse_types::Reading;

use crate::error::Result;

/// A source of readings the dashboard can poll.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Latest reading, or `None` when nothing has been recorded yet.
    async fn latest(&self) -> Result<Option<Reading>>;

    /// Retained readings, oldest first.
    async fn history(&self) -> Result<Vec<Reading>>;
}
