// Back/forward stack for a single view.
// Engine adapters that cannot query the engine's own history keep one of these
// and feed it every committed URL, plus a `settle` once each load finishes.

#[derive(Debug, Clone, Default)]
pub struct NavHistory {
    entries: Vec<String>,
    cursor: usize,
    // A load started by visit/step whose final URL is not known yet.
    loading: bool,
}

impl NavHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Records a navigation started by the user. Drops any forward entries.
    pub fn visit(&mut self, url: &str) {
        self.loading = true;
        if self.current() == Some(url) {
            return;
        }
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(url.to_string());
        self.cursor = self.entries.len() - 1;
    }

    /// Records a URL the engine reports as committed.
    ///
    /// While a load is in flight the reported URL is where that load ended
    /// up (the target itself, or a redirect of it) and overwrites the current
    /// entry. Once settled, a new URL is a navigation inside the page, such as
    /// a link click, and is pushed as a visit.
    pub fn commit(&mut self, url: &str) {
        if !self.loading {
            self.visit(url);
            return;
        }
        if self.entries.is_empty() {
            self.visit(url);
            return;
        }
        let entry = &mut self.entries[self.cursor];
        if entry.as_str() != url {
            *entry = url.to_string();
        }
    }

    /// Marks the in-flight load as finished.
    pub fn settle(&mut self) {
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn step_back(&mut self) -> Option<&str> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        self.loading = true;
        self.current()
    }

    pub fn step_forward(&mut self) -> Option<&str> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        self.loading = true;
        self.current()
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
