//! Bounded fan-out executor
//!
//! Cuts the input into windows of at most `L` items, runs each window's items
//! concurrently, and folds the outcomes back in input order. Windows run one
//! after another; the first failing window ends the run once all of its units
//! have finished.

mod dispatch;
pub mod fold;
mod sequential;
pub mod window;

pub use dispatch::dispatch;
pub use fold::{reassemble, Collect, Compact, Discard, Flatten, Fold};
pub use sequential::run_sequential;
pub use window::{Window, Windows, WorkItem};

use crate::types::Context;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Run `op` over `items` according to `ctx`, folding successes into `acc`.
///
/// A window width of one takes the sequential path, where `ctx.dispatch` has
/// no effect but `ctx.priority` still tags every unit.
pub async fn execute<I, F, Fut, R, E, A>(items: I, ctx: &Context, op: F, acc: A) -> Result<A::Output, E>
where
    I: IntoIterator,
    I::Item: Send + 'static,
    F: Fn(I::Item) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    A: Fold<R>,
{
    let width = ctx.concurrency.width();
    if width == Some(1) {
        return run_sequential(items, op, acc, ctx.priority).await;
    }
    run_windows(Windows::new(items.into_iter(), width), ctx, op, acc).await
}

async fn run_windows<I, F, Fut, R, E, A>(
    windows: Windows<I>,
    ctx: &Context,
    op: F,
    mut acc: A,
) -> Result<A::Output, E>
where
    I: Iterator,
    I::Item: Send + 'static,
    F: Fn(I::Item) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    A: Fold<R>,
{
    let op = Arc::new(op);

    for (n, window) in windows.enumerate() {
        let offset = window.offset;
        let size = window.len();
        debug!(window = n, offset, size, dispatch = ?ctx.dispatch, "dispatching window");

        let outcomes = dispatch(window, &op, ctx.dispatch, ctx.priority).await;
        if let Err(e) = reassemble(outcomes, &mut acc) {
            debug!(window = n, offset, size, "window failed; later windows skipped");
            return Err(e);
        }
    }

    Ok(acc.finish())
}
