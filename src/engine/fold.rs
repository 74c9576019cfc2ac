//! Outcome folding

/// Combination policy applied to each successful outcome, in input order.
pub trait Fold<R> {
    type Output;

    fn push(&mut self, value: R);

    fn finish(self) -> Self::Output;
}

/// Visit: values are ignored, only failures matter.
#[derive(Debug, Default)]
pub struct Discard;

impl<R> Fold<R> for Discard {
    type Output = ();

    fn push(&mut self, _value: R) {}

    fn finish(self) {}
}

/// Transform: keep every value.
#[derive(Debug)]
pub struct Collect<R>(Vec<R>);

impl<R> Collect<R> {
    pub fn with_capacity(n: usize) -> Self {
        Self(Vec::with_capacity(n))
    }
}

impl<R> Fold<R> for Collect<R> {
    type Output = Vec<R>;

    fn push(&mut self, value: R) {
        self.0.push(value);
    }

    fn finish(self) -> Vec<R> {
        self.0
    }
}

/// Transform-filter: keep present values, drop absent ones.
#[derive(Debug)]
pub struct Compact<R>(Vec<R>);

impl<R> Compact<R> {
    pub fn with_capacity(n: usize) -> Self {
        Self(Vec::with_capacity(n))
    }
}

impl<R> Fold<Option<R>> for Compact<R> {
    type Output = Vec<R>;

    fn push(&mut self, value: Option<R>) {
        if let Some(value) = value {
            self.0.push(value);
        }
    }

    fn finish(self) -> Vec<R> {
        self.0
    }
}

/// Transform-flatten: concatenate inner sequences of type `S`.
pub struct Flatten<S: IntoIterator>(Vec<S::Item>);

impl<S: IntoIterator> Flatten<S> {
    pub fn with_capacity(n: usize) -> Self {
        Self(Vec::with_capacity(n))
    }
}

impl<S: IntoIterator> Fold<S> for Flatten<S> {
    type Output = Vec<S::Item>;

    fn push(&mut self, value: S) {
        self.0.extend(value);
    }

    fn finish(self) -> Vec<S::Item> {
        self.0
    }
}

/// Fold one window's outcomes, given in index order, into `acc`.
///
/// If any outcome failed, the failure with the lowest index is returned and
/// nothing from the window reaches the accumulator.
pub fn reassemble<R, E, A>(outcomes: Vec<Result<R, E>>, acc: &mut A) -> Result<(), E>
where
    A: Fold<R>,
{
    let values = outcomes.into_iter().collect::<Result<Vec<R>, E>>()?;
    for value in values {
        acc.push(value);
    }
    Ok(())
}
