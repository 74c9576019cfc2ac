//! Window formation

use std::iter::Fuse;

/// An input element paired with its position in the original sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem<T> {
    pub index: usize,
    pub element: T,
}

/// A contiguous slice of work items processed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window<T> {
    /// Original index of the first item.
    pub offset: usize,
    pub items: Vec<WorkItem<T>>,
}

impl<T> Window<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Lazily cuts an iterator into windows of at most `width` items.
///
/// `width == None` takes everything that remains as one window. The source is
/// pulled only when the next window is requested, so a failing window leaves
/// the rest of the input untouched. The source ends at its first `None`.
pub struct Windows<I> {
    source: Fuse<I>,
    width: Option<usize>,
    offset: usize,
}

impl<I: Iterator> Windows<I> {
    pub fn new(source: I, width: Option<usize>) -> Self {
        Self {
            source: source.fuse(),
            width,
            offset: 0,
        }
    }
}

impl<I: Iterator> Iterator for Windows<I> {
    type Item = Window<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.offset;
        let elements: Vec<I::Item> = match self.width {
            Some(width) => self.source.by_ref().take(width).collect(),
            None => self.source.by_ref().collect(),
        };
        if elements.is_empty() {
            return None;
        }

        self.offset += elements.len();
        let items = elements
            .into_iter()
            .enumerate()
            .map(|(i, element)| WorkItem {
                index: offset + i,
                element,
            })
            .collect();

        Some(Window { offset, items })
    }
}
