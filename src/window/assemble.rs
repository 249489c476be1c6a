use std::collections::VecDeque;

use super::{Error, TimeWindow};
use crate::record::Timestamp;

/// FIFO queue of loaded source windows whose union is the current coverage.
///
/// Windows are enqueued in chronological order, so the coverage runs from the
/// head's start to the tail's end.
#[derive(Debug, Default)]
pub struct WindowAssemble {
    windows: VecDeque<TimeWindow>,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
}

impl WindowAssemble {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(start, end)` of the current coverage, `None` while empty.
    pub fn coverage(&self) -> Option<(Timestamp, Timestamp)> {
        self.start.zip(self.end)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn head(&self) -> Option<&TimeWindow> {
        self.windows.front()
    }

    pub fn windows(&self) -> impl Iterator<Item = &TimeWindow> {
        self.windows.iter()
    }

    pub fn enqueue(&mut self, window: TimeWindow) {
        if self.start.is_none() {
            self.start = Some(window.start());
        }
        self.end = Some(window.end());
        log::debug!(
            "Extend coverage to {} .. {}",
            window_bound(self.start),
            window.end()
        );
        self.windows.push_back(window);
    }

    /// Closes and drops the head window. Returns false if the queue was empty.
    ///
    /// Performs no intersection check; the caller only evicts windows that no
    /// longer overlap the window being built.
    pub fn dequeue(&mut self) -> bool {
        let Some(mut head) = self.windows.pop_front() else {
            return false;
        };
        head.close();
        log::debug!("Evict {}", head.path().display());
        drop(head);

        match self.windows.front() {
            Some(next) => self.start = Some(next.start()),
            None => {
                self.start = None;
                self.end = None;
            }
        }
        log::debug!(
            "Cut coverage to {} .. {}",
            window_bound(self.start),
            window_bound(self.end)
        );
        true
    }

    /// Fills `target` from every queued window, oldest first, and flushes it.
    pub fn populate(&self, target: &mut TimeWindow) -> Result<usize, Error> {
        for window in &self.windows {
            target.filter_from(window);
        }
        target.flush()
    }

    pub fn close_all(&mut self) {
        for window in self.windows.iter_mut() {
            window.close();
        }
        self.windows.clear();
        self.start = None;
        self.end = None;
    }
}

fn window_bound(bound: Option<Timestamp>) -> String {
    bound.map_or_else(|| "-".to_string(), |t| t.to_string())
}
