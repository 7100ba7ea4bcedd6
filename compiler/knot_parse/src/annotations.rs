//! Pragmas collected during a parse, held until the tree is finished.

use std::collections::TryReserveError;

use knot_diagnostic::ErrorKind;
use thiserror::Error;

/// The annotation buffer could not make room.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
pub enum AllocError {
    #[error("allocation failed")]
    Failed,
    #[error("annotation buffer cannot grow past {0} entries")]
    LimitReached(usize),
}

impl From<TryReserveError> for AllocError {
    fn from(_: TryReserveError) -> Self {
        AllocError::Failed
    }
}

impl From<AllocError> for ErrorKind {
    fn from(_: AllocError) -> Self {
        ErrorKind::OutOfMemory
    }
}

/// One diverted pragma.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Annotation {
    pub line: u32,
    pub text: String,
}

/// Append-only, insertion-ordered store of [`Annotation`]s.
///
/// Capacity doubles when full. Every reservation is fallible, and a growth
/// limit can be set so a caller can make growth fail on purpose.
#[derive(Debug)]
pub struct AnnotationBuffer {
    entries: Vec<Annotation>,
    limit: Option<usize>,
}

impl AnnotationBuffer {
    /// Buffer with room for `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize, limit: Option<usize>) -> Result<Self, AllocError> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(capacity.max(1))?;
        Ok(AnnotationBuffer { entries, limit })
    }

    /// Store one entry. On failure the entry is dropped and the stored
    /// entries are untouched.
    pub fn push(&mut self, line: u32, text: String) -> Result<(), AllocError> {
        if self.entries.len() == self.entries.capacity() {
            self.grow()?;
        }
        self.entries.push(Annotation { line, text });
        Ok(())
    }

    fn grow(&mut self) -> Result<(), AllocError> {
        let capacity = self.entries.capacity().max(1);
        let doubled = capacity.checked_mul(2).ok_or(AllocError::Failed)?;
        if let Some(limit) = self.limit {
            if doubled > limit {
                return Err(AllocError::LimitReached(limit));
            }
        }
        self.entries.try_reserve_exact(doubled - self.entries.len())?;
        Ok(())
    }

    /// Entries stored so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no pragma has been stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries the buffer holds before it next grows.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Hand the entries over in insertion order.
    pub fn drain_in_order(self) -> std::vec::IntoIter<Annotation> {
        self.entries.into_iter()
    }
}
