use serde::{Deserialize, Serialize};

pub const DEFAULT_LIST_LIMIT: u32 = 100;
pub const MAX_LIST_LIMIT: u32 = 1000;

/// Pagination for list queries. A zero limit means the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    pub limit: u32,
    pub offset: u32,
}

impl ListOptions {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// Limit with the default applied and the maximum enforced.
    pub fn effective_limit(&self) -> u32 {
        match self.limit {
            0 => DEFAULT_LIST_LIMIT,
            n => n.min(MAX_LIST_LIMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_uses_default() {
        assert_eq!(ListOptions::default().effective_limit(), DEFAULT_LIST_LIMIT);
    }

    #[test]
    fn limit_is_capped() {
        assert_eq!(ListOptions::new(5000, 0).effective_limit(), MAX_LIST_LIMIT);
        assert_eq!(ListOptions::new(10, 3).effective_limit(), 10);
    }
}
