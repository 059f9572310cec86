// Read model handed to the UI chrome after every change.
// Everything the tab strip, vertical popup and floating bar render comes from
// here, so all of them show the same labels for the same tab.

use serde::Serialize;

use crate::modules::tabs::{TabCollection, TabKind};
use crate::modules::view::{TabId, ViewFactory};
use crate::settings::{Preferences, TabLayoutMode};

/// Height of the window-controls strip at the top of the frameless window,
/// in logical pixels. Page views start below it.
pub const TITLEBAR_HEIGHT: u32 = 44;

/// Default height reserved for the floating bar, in logical pixels.
pub const DEFAULT_BAR_HEIGHT: u32 = 64;

/// Smallest page height kept when the window is shorter than the chrome.
const MIN_CONTENT_HEIGHT: u32 = 100;

/// Where page views go inside the window, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentArea {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ContentArea {
    /// The strip between the titlebar and the floating bar of a window with
    /// the given physical size and scale factor.
    pub fn within(width: u32, height: u32, scale: f64, bar_height: u32) -> Self {
        let to_physical = |logical: u32| (f64::from(logical) * scale).round() as u32;
        let top = to_physical(TITLEBAR_HEIGHT);
        let bottom = to_physical(bar_height);
        Self {
            x: 0,
            y: top,
            width,
            height: height.saturating_sub(top + bottom).max(MIN_CONTENT_HEIGHT),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabSummary {
    pub id: TabId,
    pub kind: TabKind,
    pub title: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChromeSnapshot {
    pub tabs: Vec<TabSummary>,
    pub current: usize,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub tab_mode: TabLayoutMode,
    pub light_mode: bool,
}

impl ChromeSnapshot {
    pub fn capture<F: ViewFactory>(tabs: &TabCollection<F>, preferences: &Preferences) -> Self {
        Self {
            tabs: tabs
                .iter()
                .map(|tab| TabSummary {
                    id: tab.id(),
                    kind: tab.kind(),
                    title: tab.display_title(),
                    location: tab.location(),
                    notes: tab.notes().map(str::to_string),
                })
                .collect(),
            current: tabs.current_index(),
            can_go_back: tabs.can_go_back(),
            can_go_forward: tabs.can_go_forward(),
            tab_mode: preferences.tab_mode,
            light_mode: preferences.light_mode(),
        }
    }

    pub fn current_tab(&self) -> Option<&TabSummary> {
        self.tabs.get(self.current)
    }
}
