use core::fmt::{Display, Formatter};
use core::sync::atomic::{AtomicU64, Ordering};

/// Identifies one refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out strictly increasing request ids.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    last: AtomicU64,
}

impl RequestSequencer {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: AtomicU64::new(0) }
    }

    pub fn next_id(&self) -> RequestId {
        RequestId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}
