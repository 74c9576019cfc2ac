use super::dispatch::unit_span;
use super::fold::Fold;
use crate::types::Priority;
use std::future::Future;
use tracing::Instrument;

/// Apply `op` to each element in order, one at a time.
///
/// Stops at the first failure; later elements are never pulled from `items`.
/// Each invocation runs inside the same `unit` span as a windowed unit.
pub async fn run_sequential<I, F, Fut, R, E, A>(
    items: I,
    mut op: F,
    mut acc: A,
    priority: Option<Priority>,
) -> Result<A::Output, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    A: Fold<R>,
{
    for (index, element) in items.into_iter().enumerate() {
        match op(element).instrument(unit_span(index, priority)).await {
            Ok(value) => acc.push(value),
            Err(e) => {
                tracing::debug!(index, "sequential run stopped at failing element");
                return Err(e);
            }
        }
    }
    Ok(acc.finish())
}
