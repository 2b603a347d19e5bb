//! Size policy
//!
//! Decides before any network call whether an object may be transferred.

use ragsync_core::domain::ObjectDescriptor;

/// Outcome of [`SizePolicy::admit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Transfer the object
    Proceed,
    /// Permanently reject the object
    RejectTooLarge {
        /// Object size in bytes
        size: i64,
        /// Configured limit in bytes
        limit: u64,
    },
}

/// Maximum object size admitted for transfer; 0 means unlimited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePolicy {
    max_bytes: u64,
}

impl SizePolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// A policy that admits everything
    pub fn unlimited() -> Self {
        Self::new(0)
    }

    /// A policy with a limit given in MiB
    pub fn from_megabytes(mb: u64) -> Self {
        Self::new(mb.saturating_mul(1024 * 1024))
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn is_unlimited(&self) -> bool {
        self.max_bytes == 0
    }

    /// Checks one listed object against the limit
    pub fn admit(&self, object: &ObjectDescriptor) -> Admission {
        if self.is_unlimited() || object.size <= 0 {
            return Admission::Proceed;
        }
        if object.size as u64 > self.max_bytes {
            Admission::RejectTooLarge {
                size: object.size,
                limit: self.max_bytes,
            }
        } else {
            Admission::Proceed
        }
    }
}
