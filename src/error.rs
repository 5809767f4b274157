use thiserror::Error;

/// A signal was read or written from inside a derivation body.
///
/// Derivation bodies must route every dependency through `read` so the
/// engine can record it. Direct `get`/`set` calls made while a derivation
/// is running would go unrecorded and are rejected instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("non-reactive access: signals cannot be read or written from inside a derivation body")]
pub struct NonReactiveAccess;
