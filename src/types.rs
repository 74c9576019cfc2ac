use crate::error::{FanoutError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

/// Window width used by [`Context::new`].
pub const DEFAULT_CONCURRENCY: usize = 10;

/// A validated concurrency width. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Limit(NonZeroUsize);

impl Limit {
    pub const ONE: Limit = Limit(NonZeroUsize::MIN);

    pub fn new(n: usize) -> Result<Self> {
        NonZeroUsize::new(n)
            .map(Limit)
            .ok_or(FanoutError::InvalidLimit(0))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<i64> for Limit {
    type Error = FanoutError;

    fn try_from(n: i64) -> Result<Self> {
        if n <= 0 {
            return Err(FanoutError::InvalidLimit(n));
        }
        let n = usize::try_from(n).map_err(|e| FanoutError::Other(e.to_string()))?;
        Limit::new(n)
    }
}

impl FromStr for Limit {
    type Err = FanoutError;

    fn from_str(s: &str) -> Result<Self> {
        let n: i64 = s.trim().parse()?;
        Limit::try_from(n)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How many work items may be in flight at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "limit")]
pub enum Concurrency {
    /// One at a time, stopping at the first failure.
    Sequential,
    /// At most `Limit` items per window.
    Bounded(Limit),
    /// The whole input forms a single window.
    Unbounded,
}

impl Concurrency {
    /// Window width, or `None` when the remaining input is taken as one window.
    pub fn width(&self) -> Option<usize> {
        match self {
            Concurrency::Sequential => Some(1),
            Concurrency::Bounded(limit) => Some(limit.get()),
            Concurrency::Unbounded => None,
        }
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        match NonZeroUsize::new(DEFAULT_CONCURRENCY) {
            Some(n) => Concurrency::Bounded(Limit(n)),
            None => Concurrency::Sequential,
        }
    }
}

/// How the units of a window are launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
    /// Poll every unit of the window on the calling task.
    #[default]
    Inline,
    /// Spawn every unit onto the tokio runtime (multi-thread parallelism).
    Spawned,
}

/// Scheduling hint threaded through to each unit. Not interpreted by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
}

impl FromStr for Priority {
    type Err = FanoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            other => Err(FanoutError::Other(format!("unknown priority: {other}"))),
        }
    }
}

/// Execution settings shared by the concurrent call patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub concurrency: Concurrency,
    pub dispatch: Dispatch,
    pub priority: Option<Priority>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the window width. Zero is rejected.
    pub fn with_concurrency(self, n: usize) -> Result<Self> {
        Ok(self.with_limit(Limit::new(n)?))
    }

    pub fn with_limit(mut self, limit: Limit) -> Self {
        self.concurrency = Concurrency::Bounded(limit);
        self
    }

    pub fn sequential(mut self) -> Self {
        self.concurrency = Concurrency::Sequential;
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.concurrency = Concurrency::Unbounded;
        self
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}
impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_rejects_zero_and_negative() {
        assert_eq!(Limit::new(0), Err(FanoutError::InvalidLimit(0)));
        assert_eq!(Limit::try_from(-3i64), Err(FanoutError::InvalidLimit(-3)));
        assert_eq!("0".parse::<Limit>(), Err(FanoutError::InvalidLimit(0)));
        assert!("abc".parse::<Limit>().is_err());
    }

    #[test]
    fn test_limit_parses_positive() {
        let limit: Limit = " 4 ".parse().unwrap();
        assert_eq!(limit.get(), 4);
        assert_eq!(Limit::ONE.get(), 1);
    }

    #[test]
    fn test_concurrency_width() {
        assert_eq!(Concurrency::Sequential.width(), Some(1));
        assert_eq!(Concurrency::Unbounded.width(), None);
        assert_eq!(Concurrency::default().width(), Some(DEFAULT_CONCURRENCY));
    }

    #[test]
    fn test_context_builder() {
        let ctx = Context::new()
            .with_concurrency(50)
            .unwrap()
            .with_dispatch(Dispatch::Spawned)
            .with_priority(Priority::High);

        assert_eq!(ctx.concurrency.width(), Some(50));
        assert_eq!(ctx.dispatch, Dispatch::Spawned);
        assert_eq!(ctx.priority, Some(Priority::High));
        assert!(Context::new().with_concurrency(0).is_err());
    }

    #[test]
    fn test_context_serializes() {
        let ctx = Context::new().with_concurrency(3).unwrap();
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["concurrency"]["mode"], "bounded");
        assert_eq!(json["concurrency"]["limit"], 3);
        assert_eq!(json["dispatch"], "inline");
    }
}
