//! Call Patterns
//!
//! Visit, transform, transform-filter and transform-flatten, each in a
//! strictly sequential form and a bounded-concurrency form. Results always
//! follow input order; only one error is ever returned per call.


use crate::engine::{execute, run_sequential, Collect, Compact, Discard, Flatten};
use crate::types::Context;
use std::future::Future;

fn size_hint<I: Iterator>(items: &I) -> usize {
    items.size_hint().0
}

/// Apply `op` to each element in order, one at a time.
///
/// Elements after the first failing one are never touched.
pub async fn for_each<I, F, Fut, E>(items: I, op: F) -> Result<(), E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    run_sequential(items, op, Discard, None).await
}

/// Transform each element in order, one at a time.
///
/// # Examples
/// ```
/// let doubled = fanout::runtime::block_on(fanout::map(vec![1, 2, 3], |x| async move {
///     Ok::<_, ()>(x * 2)
/// }));
/// assert_eq!(doubled, Ok(vec![2, 4, 6]));
/// ```
pub async fn map<I, F, Fut, R, E>(items: I, op: F) -> Result<Vec<R>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let items = items.into_iter();
    let acc = Collect::with_capacity(size_hint(&items));
    run_sequential(items, op, acc, None).await
}

/// Transform each element in order, keeping only present values.
pub async fn filter_map<I, F, Fut, R, E>(items: I, op: F) -> Result<Vec<R>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<Option<R>, E>>,
{
    let items = items.into_iter();
    let acc = Compact::with_capacity(size_hint(&items));
    run_sequential(items, op, acc, None).await
}

/// Transform each element into a sequence, in order, and concatenate them.
pub async fn flat_map<I, F, Fut, S, E>(items: I, op: F) -> Result<Vec<S::Item>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<S, E>>,
    S: IntoIterator,
{
    let items = items.into_iter();
    let acc = Flatten::with_capacity(size_hint(&items));
    run_sequential(items, op, acc, None).await
}

/// Visit every element with bounded concurrency.
///
/// Items run in windows of `ctx.concurrency`; a window is always allowed to
/// finish, and the lowest-index failure in it is returned. Later windows never
/// start after a failure.
pub async fn concurrent_for_each<I, F, Fut, E>(items: I, ctx: &Context, op: F) -> Result<(), E>
where
    I: IntoIterator,
    I::Item: Send + 'static,
    F: Fn(I::Item) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Send + 'static,
{
    execute(items, ctx, op, Discard).await
}

/// Transform every element with bounded concurrency, preserving input order.
///
/// # Examples
/// ```
/// use fanout::{concurrent_map, Context};
///
/// let ctx = Context::new().with_concurrency(2).unwrap();
/// let out = fanout::runtime::block_on(concurrent_map(vec![1, 2, 3, 4, 5], &ctx, |x| async move {
///     Ok::<_, String>(x * 2)
/// }));
/// assert_eq!(out, Ok(vec![2, 4, 6, 8, 10]));
/// ```
pub async fn concurrent_map<I, F, Fut, R, E>(items: I, ctx: &Context, op: F) -> Result<Vec<R>, E>
where
    I: IntoIterator,
    I::Item: Send + 'static,
    F: Fn(I::Item) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
{
    let items = items.into_iter();
    let acc = Collect::with_capacity(size_hint(&items));
    execute(items, ctx, op, acc).await
}

/// Transform every element with bounded concurrency, dropping absent values.
pub async fn concurrent_filter_map<I, F, Fut, R, E>(
    items: I,
    ctx: &Context,
    op: F,
) -> Result<Vec<R>, E>
where
    I: IntoIterator,
    I::Item: Send + 'static,
    F: Fn(I::Item) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<R>, E>> + Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
{
    let items = items.into_iter();
    let acc = Compact::with_capacity(size_hint(&items));
    execute(items, ctx, op, acc).await
}

/// Transform every element into a sequence with bounded concurrency and
/// concatenate the sequences in input order.
pub async fn concurrent_flat_map<I, F, Fut, S, E>(
    items: I,
    ctx: &Context,
    op: F,
) -> Result<Vec<S::Item>, E>
where
    I: IntoIterator,
    I::Item: Send + 'static,
    F: Fn(I::Item) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<S, E>> + Send + 'static,
    S: IntoIterator + Send + 'static,
    E: Send + 'static,
{
    let items = items.into_iter();
    let acc = Flatten::with_capacity(size_hint(&items));
    execute(items, ctx, op, acc).await
}
