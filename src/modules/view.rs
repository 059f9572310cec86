// Embedded view contract - no Tauri imports allowed.
// The tab core drives views only through these traits so it can be tested
// without a webview engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Stable identity of a tab. Never reused within a process, so an event from
/// a closed tab can never be mistaken for one from a live tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// Identity of one embedded view. A tab that swaps its view (page, home,
/// page again) gets a fresh `ViewId`, so late events from the released view
/// cannot reach its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view-{}", self.0)
    }
}

/// Notifications an engine reports about one of its views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEventKind {
    UrlChanged(String),
    TitleChanged(String),
    LoadFinished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewEvent {
    pub tab: TabId,
    pub view: ViewId,
    pub kind: ViewEventKind,
}

impl ViewEvent {
    pub fn new(tab: TabId, view: ViewId, kind: ViewEventKind) -> Self {
        Self { tab, view, kind }
    }
}

/// One embedded web view, exclusively owned by a Page tab.
pub trait EmbeddedView {
    fn navigate(&mut self, url: &str);
    fn go_back(&mut self);
    fn go_forward(&mut self);
    fn reload(&mut self);

    /// Title reported by the page, empty until the engine reports one.
    fn title(&self) -> String;
    fn url(&self) -> String;
    fn can_go_back(&self) -> bool;
    fn can_go_forward(&self) -> bool;

    /// Called with every event correlated to this view, in engine order.
    /// Adapters that cache title/URL/history update themselves here.
    fn observe(&mut self, _event: &ViewEventKind) {}

    /// Tears the view down. Called exactly once, when its tab closes or goes
    /// back to the home page.
    fn release(self)
    where
        Self: Sized;
}

/// Creates views for new Page tabs.
pub trait ViewFactory {
    type View: EmbeddedView;

    /// Builds the view `view` for `tab`. Events it reports must carry both ids.
    fn create(&mut self, tab: TabId, view: ViewId, url: &str) -> Result<Self::View>;
}
