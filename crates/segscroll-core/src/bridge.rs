//! One-way selection plumbing between the tab strip and the paging view.
//!
//! Taps travel tab strip → bridge → pager. Pages settled by a direct swipe
//! travel pager → bridge → tab strip. Neither path calls back into the side
//! it came from, so a selection can never bounce between the two.

use tracing::debug;

/// Content view that shows one child at a time
pub trait PageView {
    /// Show the child at `index`, sliding if `animated`
    fn move_to(&mut self, index: usize, animated: bool);
}

/// Row of segment labels with a selection indicator
pub trait TabStrip {
    /// Move the indicator to `index` without emitting a tap
    fn select(&mut self, index: usize);
}

/// Called with `(index, label)` once per confirmed selection
pub type SelectionListener = Box<dyn FnMut(usize, &str)>;

pub struct SelectionBridge {
    labels: Vec<String>,
    selected: usize,
    listener: Option<SelectionListener>,
}

impl Default for SelectionBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionBridge {
    pub fn new() -> Self {
        Self {
            labels: Vec::new(),
            selected: 0,
            listener: None,
        }
    }

    pub fn with_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            selected: 0,
            listener: None,
        }
    }

    pub fn push_label(&mut self, label: impl Into<String>) -> usize {
        self.labels.push(label.into());
        self.labels.len() - 1
    }

    /// Drop the label at `index`. The selection stays on the same label when
    /// it survives, otherwise it moves to the label that took its place.
    pub fn remove_label(&mut self, index: usize) -> Option<String> {
        if !self.contains(index) {
            return None;
        }
        let label = self.labels.remove(index);
        if self.selected > index {
            self.selected -= 1;
        }
        self.selected = self.selected.min(self.labels.len().saturating_sub(1));
        Some(label)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.labels.len()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Replace the selection listener
    pub fn set_listener<F>(&mut self, listener: F)
    where
        F: FnMut(usize, &str) + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// A tab was tapped. Pages to it and notifies the listener.
    ///
    /// Out-of-range indices are ignored and return `false`.
    pub fn on_tab_selected(&mut self, index: usize, pager: &mut dyn PageView) -> bool {
        if !self.contains(index) {
            debug!(index, count = self.labels.len(), "Tab index out of range, ignoring");
            return false;
        }

        self.selected = index;
        pager.move_to(index, true);
        self.notify(index);
        true
    }

    /// The pager settled on `index` after a swipe. Moves the tab indicator
    /// and notifies the listener, without paging again.
    ///
    /// Settling on the current selection is not a transition and does nothing.
    pub fn on_page_settled(&mut self, index: usize, strip: &mut dyn TabStrip) -> bool {
        if !self.contains(index) {
            debug!(index, count = self.labels.len(), "Settled page out of range, ignoring");
            return false;
        }
        if index == self.selected {
            return false;
        }

        self.selected = index;
        strip.select(index);
        self.notify(index);
        true
    }

    fn notify(&mut self, index: usize) {
        if let Some(listener) = self.listener.as_mut() {
            listener(index, &self.labels[index]);
        }
    }
}
