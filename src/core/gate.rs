//! Artifact existence gate.
//!
//! `ensure` checks whether an artifact is on disk and only runs its producer
//! when it is not. The producer is responsible for writing the file; the gate
//! never writes anything itself. Existence is the only signal consulted.
//!
//! The check and the write are two separate steps. Two processes sharing an
//! output directory can both see MISSING and both produce. If that ever needs
//! to be safe, the producer has to switch to an atomic create-if-absent.

use std::future::Future;
use std::path::Path;

use tracing::{debug, warn};

/// Result of passing an artifact through the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Artifact was already present, producer not called
    CacheHit,

    /// Producer ran
    Produced,
}

impl GateOutcome {
    pub fn is_hit(self) -> bool {
        matches!(self, Self::CacheHit)
    }
}

/// Run `produce` unless `path` already exists
///
/// Errors from `produce` are returned unchanged.
pub fn ensure<F, E>(path: &Path, produce: F) -> Result<GateOutcome, E>
where
    F: FnOnce() -> Result<(), E>,
{
    if path.exists() {
        debug!(operation = "gate.ensure", status = "hit", path = %path.display(), "artifact exists");
        return Ok(GateOutcome::CacheHit);
    }

    produce()?;
    record_produced(path);
    Ok(GateOutcome::Produced)
}

/// Async form of [`ensure`] for producers that await I/O
pub async fn ensure_async<F, Fut, E>(path: &Path, produce: F) -> Result<GateOutcome, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    if path.exists() {
        debug!(operation = "gate.ensure", status = "hit", path = %path.display(), "artifact exists");
        return Ok(GateOutcome::CacheHit);
    }

    produce().await?;
    record_produced(path);
    Ok(GateOutcome::Produced)
}

/// True iff every path exists (vacuously true for an empty set)
pub fn all_exist<I, P>(paths: I) -> bool
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths.into_iter().all(|p| p.as_ref().exists())
}

fn record_produced(path: &Path) {
    if path.exists() {
        debug!(operation = "gate.ensure", status = "produced", path = %path.display(), "artifact produced");
    } else {
        warn!(
            operation = "gate.ensure",
            status = "missing",
            path = %path.display(),
            "producer succeeded without writing its artifact"
        );
    }
}
