//! Index-tagging dispatcher
//!
//! Launches one unit of work per item of a window, waits for all of them and
//! hands back the outcomes in index order. A failing unit never cancels its
//! siblings.

use super::window::{Window, WorkItem};
use crate::types::{Dispatch, Priority};
use futures_util::future::join_all;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{trace, trace_span, Instrument, Span};

/// One result slot per position in the window.
struct Slots<R, E> {
    offset: usize,
    slots: Vec<Option<Result<R, E>>>,
}

impl<R, E> Slots<R, E> {
    fn new(offset: usize, len: usize) -> Self {
        Self {
            offset,
            slots: std::iter::repeat_with(|| None).take(len).collect(),
        }
    }

    fn fill(&mut self, index: usize, outcome: Result<R, E>) {
        self.slots[index - self.offset] = Some(outcome);
    }

    fn into_outcomes(self) -> Vec<Result<R, E>> {
        debug_assert!(self.slots.iter().all(Option::is_some), "unfilled slot");
        self.slots.into_iter().flatten().collect()
    }
}

/// Span carrying a unit's position and scheduling hint.
pub(super) fn unit_span(index: usize, priority: Option<Priority>) -> Span {
    trace_span!("unit", index, priority = ?priority)
}

/// Run every item of `window` through `op` and wait for all of them.
pub async fn dispatch<T, F, Fut, R, E>(
    window: Window<T>,
    op: &Arc<F>,
    mode: Dispatch,
    priority: Option<Priority>,
) -> Vec<Result<R, E>>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
{
    if window.is_empty() {
        return Vec::new();
    }
    match mode {
        Dispatch::Inline => dispatch_inline(window, &**op, priority).await,
        Dispatch::Spawned => dispatch_spawned(window, op, priority).await,
    }
}

async fn dispatch_inline<T, F, Fut, R, E>(
    window: Window<T>,
    op: &F,
    priority: Option<Priority>,
) -> Vec<Result<R, E>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let mut slots = Slots::new(window.offset, window.len());

    // join_all drains the iterator (invoking `op` for every item) before polling.
    let units = window.items.into_iter().map(|WorkItem { index, element }| {
        let unit = op(element);
        async move {
            let outcome = unit.await;
            trace!(failed = outcome.is_err(), "unit finished");
            (index, outcome)
        }
        .instrument(unit_span(index, priority))
    });

    for (index, outcome) in join_all(units).await {
        slots.fill(index, outcome);
    }
    slots.into_outcomes()
}

async fn dispatch_spawned<T, F, Fut, R, E>(
    window: Window<T>,
    op: &Arc<F>,
    priority: Option<Priority>,
) -> Vec<Result<R, E>>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
{
    let mut slots = Slots::new(window.offset, window.len());
    let mut set = JoinSet::new();

    for WorkItem { index, element } in window.items {
        let op = Arc::clone(op);
        set.spawn(
            async move {
                let outcome = op(element).await;
                trace!(failed = outcome.is_err(), "unit finished");
                (index, outcome)
            }
            .instrument(unit_span(index, priority)),
        );
    }

    // Drain the whole set before re-raising a panic so siblings still finish.
    let mut panic: Option<Box<dyn Any + Send>> = None;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, outcome)) => slots.fill(index, outcome),
            Err(err) => match err.try_into_panic() {
                Ok(payload) => {
                    panic.get_or_insert(payload);
                }
                Err(err) => {
                    panic.get_or_insert(Box::new(format!("unit did not complete: {err}")));
                }
            },
        }
    }
    if let Some(payload) = panic {
        std::panic::resume_unwind(payload);
    }

    slots.into_outcomes()
}
