// Tauri child webviews as tab views.
// Engine callbacks are turned into ViewEvents and queued onto the main
// thread; they never touch tab state from inside the callback.

use tauri::webview::PageLoadEvent;
use tauri::{AppHandle, PhysicalPosition, PhysicalSize, Rect, Webview, WebviewBuilder, WebviewUrl, Window};
use url::Url;

use crate::error::{Error, Result};
use crate::history::NavHistory;
use crate::modules::chrome::{ContentArea, DEFAULT_BAR_HEIGHT};
use crate::modules::view::{EmbeddedView, TabId, ViewEvent, ViewEventKind, ViewFactory, ViewId};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct WebviewTab {
    tab: TabId,
    webview: Webview,
    history: NavHistory,
    title: String,
}

impl WebviewTab {
    fn load(&self, url: &str) {
        match Url::parse(url) {
            Ok(parsed) => {
                if let Err(e) = self.webview.navigate(parsed) {
                    log::warn!("[Webview] {} failed to load {}: {}", self.tab, url, e);
                }
            }
            Err(e) => log::warn!("[Webview] {} refusing invalid URL {:?}: {}", self.tab, url, e),
        }
    }

    pub fn set_visible(&self, visible: bool) {
        let result = if visible { self.webview.show() } else { self.webview.hide() };
        if let Err(e) = result {
            log::warn!("[Webview] Failed to toggle visibility of {}: {}", self.tab, e);
        }
    }

    pub fn set_bounds(&self, bounds: Rect) {
        if let Err(e) = self.webview.set_bounds(bounds) {
            log::warn!("[Webview] Failed to resize {}: {}", self.tab, e);
        }
    }
}

impl EmbeddedView for WebviewTab {
    fn navigate(&mut self, url: &str) {
        self.history.visit(url);
        self.title.clear();
        self.load(url);
    }

    fn go_back(&mut self) {
        if let Some(target) = self.history.step_back().map(str::to_string) {
            self.load(&target);
        }
    }

    fn go_forward(&mut self) {
        if let Some(target) = self.history.step_forward().map(str::to_string) {
            self.load(&target);
        }
    }

    fn reload(&mut self) {
        if let Err(e) = self.webview.eval("window.location.reload()") {
            log::warn!("[Webview] Failed to reload {}: {}", self.tab, e);
        }
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn url(&self) -> String {
        self.history.current().unwrap_or_default().to_string()
    }

    fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    fn observe(&mut self, event: &ViewEventKind) {
        match event {
            ViewEventKind::UrlChanged(url) => self.history.commit(url),
            ViewEventKind::TitleChanged(title) => self.title = title.clone(),
            ViewEventKind::LoadFinished => self.history.settle(),
        }
    }

    fn release(self) {
        log::debug!("[Webview] Closing {}", self.tab);
        if let Err(e) = self.webview.close() {
            log::warn!("[Webview] Failed to close {}: {}", self.tab, e);
        }
    }
}

pub struct WebviewFactory {
    app: AppHandle,
    window: Window,
}

impl WebviewFactory {
    pub fn new(app: AppHandle, window: Window) -> Self {
        Self { app, window }
    }

    fn content_area(&self, bar_height: u32) -> tauri::Result<ContentArea> {
        let size = self.window.inner_size()?;
        let scale = self.window.scale_factor()?;
        Ok(ContentArea::within(size.width, size.height, scale, bar_height))
    }

    /// Area between the titlebar and the floating bar, in physical pixels.
    pub fn content_bounds(&self, bar_height: u32) -> Option<Rect> {
        let area = self
            .content_area(bar_height)
            .map_err(|e| log::warn!("[Webview] Failed to measure the window: {}", e))
            .ok()?;
        Some(Rect {
            position: tauri::Position::Physical(PhysicalPosition::new(area.x as i32, area.y as i32)),
            size: tauri::Size::Physical(PhysicalSize::new(area.width, area.height)),
        })
    }
}

impl ViewFactory for WebviewFactory {
    type View = WebviewTab;

    fn create(&mut self, tab: TabId, view: ViewId, url: &str) -> Result<WebviewTab> {
        let view_error = |reason: String| Error::View { tab, reason };
        let parsed = Url::parse(url).map_err(|e| view_error(e.to_string()))?;

        let load_app = self.app.clone();
        let title_app = self.app.clone();
        // One label per view: a tab that reopens a page never reuses the
        // label of the webview it just closed.
        let label = format!("{}-{}", tab, view);
        let builder = WebviewBuilder::new(label, WebviewUrl::External(parsed))
            .user_agent(USER_AGENT)
            .on_page_load(move |_webview, payload| {
                let kind = match payload.event() {
                    PageLoadEvent::Started => ViewEventKind::UrlChanged(payload.url().to_string()),
                    PageLoadEvent::Finished => ViewEventKind::LoadFinished,
                };
                super::forward_event(&load_app, ViewEvent::new(tab, view, kind));
            })
            .on_document_title_changed(move |_webview, title| {
                super::forward_event(&title_app, ViewEvent::new(tab, view, ViewEventKind::TitleChanged(title)));
            });

        // The shell refits bounds with the configured bar height right after.
        let area = self
            .content_area(DEFAULT_BAR_HEIGHT)
            .map_err(|e| view_error(e.to_string()))?;
        let webview = self
            .window
            .add_child(
                builder,
                PhysicalPosition::new(area.x as i32, area.y as i32),
                PhysicalSize::new(area.width, area.height),
            )
            .map_err(|e| view_error(e.to_string()))?;

        let mut history = NavHistory::new();
        history.visit(url);
        log::info!("[Webview] Created {} of {} for {}", view, tab, url);

        Ok(WebviewTab {
            tab,
            webview,
            history,
            title: String::new(),
        })
    }
}
