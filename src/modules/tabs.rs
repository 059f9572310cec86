// Tab collection - pure logic, no Tauri imports.
// Owns the ordered tabs and the current index. Every change to tab topology
// goes through the methods here so the index bookkeeping stays in one place.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::modules::navigation::{self, NEW_TAB_TITLE};
use crate::modules::view::{EmbeddedView, TabId, ViewEvent, ViewFactory, ViewId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TabKind {
    Home,
    #[default]
    Page,
    Notes,
    Sketch,
}

#[derive(Debug)]
pub enum TabContent<V> {
    Home,
    Page(V),
    Notes(String),
    Sketch,
}

#[derive(Debug)]
pub struct Tab<V> {
    id: TabId,
    // Set while `content` is a Page.
    view_id: Option<ViewId>,
    content: TabContent<V>,
}

impl<V: EmbeddedView> Tab<V> {
    pub fn id(&self) -> TabId {
        self.id
    }

    /// Identity of the view currently shown, if this is a Page tab.
    pub fn view_id(&self) -> Option<ViewId> {
        self.view_id
    }

    pub fn content(&self) -> &TabContent<V> {
        &self.content
    }

    pub fn kind(&self) -> TabKind {
        match self.content {
            TabContent::Home => TabKind::Home,
            TabContent::Page(_) => TabKind::Page,
            TabContent::Notes(_) => TabKind::Notes,
            TabContent::Sketch => TabKind::Sketch,
        }
    }

    pub fn display_title(&self) -> String {
        match &self.content {
            TabContent::Home => NEW_TAB_TITLE.to_string(),
            TabContent::Page(view) => navigation::display_title(&view.url(), &view.title()),
            TabContent::Notes(_) => "Notes".to_string(),
            TabContent::Sketch => "Sketch".to_string(),
        }
    }

    /// Address-bar text. Empty for everything but Page tabs.
    pub fn location(&self) -> String {
        match &self.content {
            TabContent::Page(view) => navigation::display_location(&view.url()),
            TabContent::Home | TabContent::Notes(_) | TabContent::Sketch => String::new(),
        }
    }

    /// The view's URL as the engine reports it, without display rewriting.
    pub fn raw_url(&self) -> Option<String> {
        match &self.content {
            TabContent::Page(view) => Some(view.url()),
            TabContent::Home | TabContent::Notes(_) | TabContent::Sketch => None,
        }
    }

    pub fn can_go_back(&self) -> bool {
        match &self.content {
            TabContent::Page(view) => view.can_go_back(),
            TabContent::Home | TabContent::Notes(_) | TabContent::Sketch => false,
        }
    }

    pub fn can_go_forward(&self) -> bool {
        match &self.content {
            TabContent::Page(view) => view.can_go_forward(),
            TabContent::Home | TabContent::Notes(_) | TabContent::Sketch => false,
        }
    }

    pub fn notes(&self) -> Option<&str> {
        match &self.content {
            TabContent::Notes(text) => Some(text),
            TabContent::Home | TabContent::Page(_) | TabContent::Sketch => None,
        }
    }

    pub fn view(&self) -> Option<&V> {
        match &self.content {
            TabContent::Page(view) => Some(view),
            TabContent::Home | TabContent::Notes(_) | TabContent::Sketch => None,
        }
    }

    fn release(self) {
        if let TabContent::Page(view) = self.content {
            view.release();
        }
    }
}

/// Result of [`TabCollection::close`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// The tab was the last one. Nothing was removed; the caller shuts down.
    Terminate,
    /// Index out of range, nothing changed.
    Ignored,
}

pub struct TabCollection<F: ViewFactory> {
    factory: F,
    tabs: Vec<Tab<F::View>>,
    current: usize,
    next_id: u64,
    next_view: u64,
}

impl<F: ViewFactory> TabCollection<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            tabs: Vec::new(),
            current: 0,
            next_id: 1,
            next_view: 1,
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    fn allocate_id(&mut self) -> TabId {
        let id = TabId(self.next_id);
        self.next_id += 1;
        id
    }

    fn create_view(&mut self, tab: TabId, url: &str) -> Result<(ViewId, F::View)> {
        let view = ViewId(self.next_view);
        self.next_view += 1;
        Ok((view, self.factory.create(tab, view, url)?))
    }

    /// Appends a tab and makes it current. A Page without a location (or
    /// `about:blank`) becomes a Home tab.
    pub fn create(&mut self, location: Option<&str>, kind: TabKind) -> Result<usize> {
        let id = self.allocate_id();
        let (view_id, content) = match kind {
            TabKind::Page => match location.filter(|l| !navigation::is_blank(l)) {
                Some(url) => {
                    let (view_id, view) = self.create_view(id, url)?;
                    (Some(view_id), TabContent::Page(view))
                }
                None => (None, TabContent::Home),
            },
            TabKind::Home => (None, TabContent::Home),
            TabKind::Notes => (None, TabContent::Notes(String::new())),
            TabKind::Sketch => (None, TabContent::Sketch),
        };

        self.tabs.push(Tab { id, view_id, content });
        self.current = self.tabs.len() - 1;
        log::info!("[Tabs] Created {} ({:?}) at index {}", id, self.tabs[self.current].kind(), self.current);
        Ok(self.current)
    }

    pub fn close(&mut self, index: usize) -> CloseOutcome {
        if index >= self.tabs.len() {
            log::debug!("[Tabs] Ignoring close of stale index {}", index);
            return CloseOutcome::Ignored;
        }
        if self.tabs.len() == 1 {
            log::info!("[Tabs] Closing the last tab, requesting shutdown");
            return CloseOutcome::Terminate;
        }

        let tab = self.tabs.remove(index);
        // Covers both "closed the current tab" and "closed one before it".
        if self.current >= index {
            self.current = self.current.saturating_sub(1);
        }
        log::info!("[Tabs] Closed {} at index {}, current is now {}", tab.id, index, self.current);
        tab.release();
        CloseOutcome::Closed
    }

    /// Out-of-range indices are ignored: they come from UI callbacks racing
    /// with a close.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            log::debug!("[Tabs] Ignoring select of stale index {}", index);
            return false;
        }
        self.current = index;
        true
    }

    /// Moves a tab, shifting the tabs in between (list move, not swap).
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.tabs.len();
        if from == to || from >= len || to >= len {
            return false;
        }

        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);

        if self.current == from {
            self.current = to;
        } else if from < self.current && self.current <= to {
            self.current -= 1;
        } else if to <= self.current && self.current < from {
            self.current += 1;
        }
        log::debug!("[Tabs] Moved tab {} -> {}, current is now {}", from, to, self.current);
        true
    }

    /// Loads `url` for the current tab and returns the index of the tab that
    /// shows it. Notes and Sketch tabs keep their content: the page opens in
    /// a new tab instead.
    pub fn open_location(&mut self, url: &str) -> Result<usize> {
        let Some(kind) = self.current().map(Tab::kind) else {
            return self.create(Some(url), TabKind::Page);
        };
        let index = self.current;

        match kind {
            TabKind::Page if navigation::is_blank(url) => {
                let tab = &mut self.tabs[index];
                tab.view_id = None;
                let old = std::mem::replace(&mut tab.content, TabContent::Home);
                if let TabContent::Page(view) = old {
                    view.release();
                }
            }
            TabKind::Page => {
                if let TabContent::Page(view) = &mut self.tabs[index].content {
                    view.navigate(url);
                }
            }
            TabKind::Home if navigation::is_blank(url) => {}
            TabKind::Home => {
                let id = self.tabs[index].id;
                let (view_id, view) = self.create_view(id, url)?;
                let tab = &mut self.tabs[index];
                tab.view_id = Some(view_id);
                tab.content = TabContent::Page(view);
                log::info!("[Tabs] {} left the home page for {} ({})", id, url, view_id);
            }
            TabKind::Notes | TabKind::Sketch => {
                return self.create(Some(url), TabKind::Page);
            }
        }
        Ok(index)
    }

    fn current_view_mut(&mut self) -> Option<&mut F::View> {
        match self.tabs.get_mut(self.current).map(|t| &mut t.content) {
            Some(TabContent::Page(view)) => Some(view),
            _ => None,
        }
    }

    pub fn go_back(&mut self) {
        if let Some(view) = self.current_view_mut() {
            view.go_back();
        }
    }

    pub fn go_forward(&mut self) {
        if let Some(view) = self.current_view_mut() {
            view.go_forward();
        }
    }

    pub fn reload(&mut self) {
        if let Some(view) = self.current_view_mut() {
            view.reload();
        }
    }

    /// Routes an engine event to its tab by identity. Returns the tab's
    /// current index, or `None` when the event was dropped: the tab is gone,
    /// or the view that sent it has since been released.
    pub fn apply(&mut self, event: &ViewEvent) -> Option<usize> {
        let Some(index) = self.position(event.tab) else {
            log::debug!("[Tabs] Dropping {:?} for closed {}", event.kind, event.tab);
            return None;
        };
        let tab = &mut self.tabs[index];
        if tab.view_id != Some(event.view) {
            log::debug!("[Tabs] Dropping {:?} from released {} of {}", event.kind, event.view, event.tab);
            return None;
        }
        match &mut tab.content {
            TabContent::Page(view) => {
                view.observe(&event.kind);
                Some(index)
            }
            TabContent::Home | TabContent::Notes(_) | TabContent::Sketch => {
                log::debug!("[Tabs] Dropping {:?} for {} without a view", event.kind, event.tab);
                None
            }
        }
    }

    pub fn set_notes(&mut self, index: usize, text: String) -> bool {
        match self.tabs.get_mut(index).map(|t| &mut t.content) {
            Some(TabContent::Notes(notes)) => {
                *notes = text;
                true
            }
            _ => false,
        }
    }

    /// Teardown: releases every view once and leaves the collection empty.
    pub fn release_all(&mut self) {
        let count = self.tabs.len();
        for tab in self.tabs.drain(..) {
            tab.release();
        }
        self.current = 0;
        log::info!("[Tabs] Released {} tabs", count);
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Tab<F::View>> {
        self.tabs.get(self.current)
    }

    pub fn get(&self, index: usize) -> Option<&Tab<F::View>> {
        self.tabs.get(index)
    }

    pub fn position(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab<F::View>> {
        self.tabs.iter()
    }

    pub fn titles(&self) -> Vec<String> {
        self.tabs.iter().map(Tab::display_title).collect()
    }

    pub fn can_go_back(&self) -> bool {
        self.current().is_some_and(Tab::can_go_back)
    }

    pub fn can_go_forward(&self) -> bool {
        self.current().is_some_and(Tab::can_go_forward)
    }
}
