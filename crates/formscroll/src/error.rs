//! Engine error taxonomy. Deliberately narrow: everything except a
//! missing provider degrades to a silent no-op and self-corrects on the
//! next layout or focus event.

use thiserror::Error;

/// Returned when a consumer reads the shared scroll context outside a
/// mounted scope. Fail fast: this is an integration mistake, not a
/// runtime condition to recover from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no smart-scroll scope is mounted; wrap the consumer in a SmartScrollController scope")]
pub struct MissingProviderError;
