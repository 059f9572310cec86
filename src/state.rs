// Application context: the one place that owns the tabs and the preferences.
// Built explicitly at startup and handed to the shell; `shutdown` is the
// matching teardown.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::modules::chrome::ChromeSnapshot;
use crate::modules::navigation::{smart_parse_url, BLANK_URL};
use crate::modules::tabs::{CloseOutcome, TabCollection, TabKind};
use crate::modules::view::{ViewEvent, ViewFactory};
use crate::settings::Preferences;

/// Highest tab position reachable from the number keys.
pub const MAX_TAB_NUMBER: usize = 9;

pub struct AppContext<F: ViewFactory> {
    tabs: TabCollection<F>,
    preferences: Preferences,
    preferences_path: PathBuf,
}

impl<F: ViewFactory> AppContext<F> {
    /// Loads preferences (defaults on any failure) and opens the first tab.
    pub fn new(factory: F, preferences_path: PathBuf) -> Result<Self> {
        let preferences = Preferences::load(&preferences_path);
        let mut tabs = TabCollection::new(factory);
        tabs.create(None, TabKind::Home)?;
        log::info!(
            "[App] Started with {:?} tabs and {} theme",
            preferences.tab_mode,
            if preferences.light_mode() { "light" } else { "dark" }
        );

        Ok(Self {
            tabs,
            preferences,
            preferences_path,
        })
    }

    pub fn tabs(&self) -> &TabCollection<F> {
        &self.tabs
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_path(&self) -> &Path {
        &self.preferences_path
    }

    pub fn snapshot(&self) -> ChromeSnapshot {
        ChromeSnapshot::capture(&self.tabs, &self.preferences)
    }

    pub fn new_tab(&mut self, input: Option<&str>) -> Result<usize> {
        let url = input.map(|i| smart_parse_url(i, &self.preferences));
        self.tabs.create(url.as_deref(), TabKind::Page)
    }

    pub fn new_notes_tab(&mut self) -> Result<usize> {
        self.tabs.create(None, TabKind::Notes)
    }

    pub fn new_sketch_tab(&mut self) -> Result<usize> {
        self.tabs.create(None, TabKind::Sketch)
    }

    /// Address-bar submit. Blank input is ignored.
    pub fn navigate(&mut self, input: &str) -> Result<usize> {
        if input.trim().is_empty() {
            return Ok(self.tabs.current_index());
        }
        let url = smart_parse_url(input, &self.preferences);
        log::info!("[App] Navigating to {}", url);
        self.tabs.open_location(&url)
    }

    pub fn close_tab(&mut self, index: usize) -> CloseOutcome {
        self.tabs.close(index)
    }

    pub fn close_current_tab(&mut self) -> CloseOutcome {
        self.tabs.close(self.tabs.current_index())
    }

    pub fn select_tab(&mut self, index: usize) -> bool {
        self.tabs.select(index)
    }

    /// Selects by 1-based position, as bound to the number keys. Positions
    /// past the last tab, or outside 1 to 9, do nothing.
    pub fn select_tab_number(&mut self, number: usize) -> bool {
        if !(1..=MAX_TAB_NUMBER).contains(&number) {
            return false;
        }
        self.tabs.select(number - 1)
    }

    /// Shows the home page in place of the current page.
    pub fn go_home(&mut self) -> Result<usize> {
        self.tabs.open_location(BLANK_URL)
    }

    /// URL of the current Page tab, as the engine reports it.
    pub fn current_url(&self) -> Option<String> {
        self.tabs.current().and_then(|tab| tab.raw_url())
    }

    pub fn reorder_tabs(&mut self, from: usize, to: usize) -> bool {
        self.tabs.reorder(from, to)
    }

    pub fn go_back(&mut self) {
        self.tabs.go_back();
    }

    pub fn go_forward(&mut self) {
        self.tabs.go_forward();
    }

    pub fn reload(&mut self) {
        self.tabs.reload();
    }

    pub fn update_notes(&mut self, index: usize, text: String) -> bool {
        self.tabs.set_notes(index, text)
    }

    pub fn dispatch(&mut self, event: &ViewEvent) -> Option<usize> {
        self.tabs.apply(event)
    }

    /// Applies and persists new preferences. A failed write is logged; the
    /// new values stay in effect for this run.
    pub fn update_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
        self.flush_preferences();
    }

    fn flush_preferences(&self) {
        if let Err(e) = self.preferences.save(&self.preferences_path) {
            log::warn!("[App] Failed to save preferences: {}", e);
        }
    }

    /// Flushes preferences and releases every view. Safe to call twice.
    pub fn shutdown(&mut self) {
        log::info!("[App] Shutting down");
        self.flush_preferences();
        self.tabs.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::FakeFactory;
    use crate::modules::view::ViewEventKind;
    use crate::settings::{TabLayoutMode, Theme, PREFERENCES_FILE};
    use rstest::rstest;
    use tempfile::{tempdir, TempDir};

    fn context() -> (AppContext<FakeFactory>, TempDir) {
        let dir = tempdir().unwrap();
        let ctx = AppContext::new(FakeFactory::new(), dir.path().join(PREFERENCES_FILE)).unwrap();
        (ctx, dir)
    }

    #[test]
    fn test_starts_with_home_tab_and_defaults() {
        let (ctx, _dir) = context();

        assert_eq!(ctx.tabs().len(), 1);
        assert_eq!(ctx.tabs().current().unwrap().kind(), TabKind::Home);
        assert_eq!(ctx.preferences(), &Preferences::default());
    }

    #[test]
    fn test_loads_existing_preferences() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(PREFERENCES_FILE);
        std::fs::write(&path, r#"{ "tab_mode": "horizontal", "light_mode": true }"#).unwrap();

        let ctx = AppContext::new(FakeFactory::new(), path).unwrap();

        assert_eq!(ctx.preferences().tab_mode, TabLayoutMode::Horizontal);
        assert_eq!(ctx.preferences().theme, Theme::Light);
    }

    #[test]
    fn test_navigate_search_shows_query() {
        let (mut ctx, _dir) = context();

        ctx.navigate("hello world").unwrap();

        let snapshot = ctx.snapshot();
        let tab = snapshot.current_tab().unwrap();
        assert_eq!(tab.kind, TabKind::Page);
        assert_eq!(tab.title, "hello world");
        assert_eq!(tab.location, "hello world");
        assert_eq!(ctx.tabs().len(), 1);
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let (mut ctx, _dir) = context();

        assert_eq!(ctx.navigate("   ").unwrap(), 0);
        assert_eq!(ctx.tabs().current().unwrap().kind(), TabKind::Home);
    }

    #[test]
    fn test_navigate_from_notes_opens_new_tab() {
        let (mut ctx, _dir) = context();
        let notes = ctx.new_notes_tab().unwrap();
        ctx.update_notes(notes, "remember".into());

        let index = ctx.navigate("example.com").unwrap();

        assert_eq!(index, 2);
        assert_eq!(ctx.tabs().get(notes).unwrap().notes(), Some("remember"));
        assert_eq!(ctx.tabs().current().unwrap().location(), "https://example.com/");
    }

    #[test]
    fn test_new_tab_parses_input() {
        let (mut ctx, _dir) = context();

        ctx.new_tab(Some("localhost:3000")).unwrap();
        ctx.new_tab(None).unwrap();

        assert_eq!(ctx.tabs().get(1).unwrap().raw_url().as_deref(), Some("http://localhost:3000/"));
        assert_eq!(ctx.tabs().get(2).unwrap().kind(), TabKind::Home);
    }

    #[test]
    fn test_reload_reaches_current_view() {
        let factory = FakeFactory::new();
        let journal = factory.journal();
        let dir = tempdir().unwrap();
        let mut ctx = AppContext::new(factory, dir.path().join(PREFERENCES_FILE)).unwrap();
        ctx.navigate("example.com").unwrap();

        ctx.reload();
        ctx.new_sketch_tab().unwrap();
        ctx.reload();

        assert_eq!(journal.reloads(), 1);
    }

    #[test]
    fn test_dispatch_updates_snapshot() {
        let (mut ctx, _dir) = context();
        ctx.navigate("example.com").unwrap();
        let tab = ctx.tabs().current().unwrap();
        let event = ViewEvent::new(tab.id(), tab.view_id().unwrap(), ViewEventKind::TitleChanged("Example Domain".into()));

        ctx.dispatch(&event);

        assert_eq!(ctx.snapshot().current_tab().unwrap().title, "Example Domain");
    }

    #[rstest]
    #[case(1, true, 0)]
    #[case(3, true, 2)]
    #[case(4, false, 1)]
    #[case(9, false, 1)]
    #[case(0, false, 1)]
    fn test_select_tab_number(#[case] number: usize, #[case] selected: bool, #[case] current: usize) {
        let (mut ctx, _dir) = context();
        ctx.new_notes_tab().unwrap();
        ctx.new_sketch_tab().unwrap();
        ctx.select_tab(1);

        assert_eq!(ctx.select_tab_number(number), selected);
        assert_eq!(ctx.tabs().current_index(), current);
    }

    #[test]
    fn test_number_keys_stop_at_nine() {
        let (mut ctx, _dir) = context();
        for _ in 0..10 {
            ctx.new_tab(None).unwrap();
        }

        assert!(ctx.select_tab_number(9));
        assert_eq!(ctx.tabs().current_index(), 8);
        assert!(!ctx.select_tab_number(10));
        assert_eq!(ctx.tabs().current_index(), 8);
    }

    #[test]
    fn test_go_home_releases_page() {
        let factory = FakeFactory::new();
        let journal = factory.journal();
        let dir = tempdir().unwrap();
        let mut ctx = AppContext::new(factory, dir.path().join(PREFERENCES_FILE)).unwrap();
        ctx.navigate("example.com").unwrap();
        let id = ctx.tabs().current().unwrap().id();

        assert_eq!(ctx.go_home().unwrap(), 0);

        assert_eq!(ctx.tabs().current().unwrap().kind(), TabKind::Home);
        assert_eq!(ctx.current_url(), None);
        assert_eq!(journal.releases(), vec![id]);
    }

    #[test]
    fn test_current_url_is_raw() {
        let (mut ctx, _dir) = context();
        assert_eq!(ctx.current_url(), None);

        ctx.navigate("hello world").unwrap();

        assert_eq!(
            ctx.current_url().as_deref(),
            Some("https://www.google.com/search?q=hello%20world")
        );
    }

    #[test]
    fn test_update_preferences_persists() {
        let (mut ctx, _dir) = context();
        let prefs = Preferences {
            tab_mode: TabLayoutMode::Horizontal,
            ..Preferences::default()
        };

        ctx.update_preferences(prefs.clone());

        assert_eq!(Preferences::load(ctx.preferences_path()), prefs);
        assert_eq!(ctx.snapshot().tab_mode, TabLayoutMode::Horizontal);
    }

    #[test]
    fn test_close_current_last_tab_terminates() {
        let (mut ctx, _dir) = context();
        assert_eq!(ctx.close_current_tab(), CloseOutcome::Terminate);
        assert_eq!(ctx.tabs().len(), 1);
    }

    #[test]
    fn test_shutdown_flushes_and_releases() {
        let factory = FakeFactory::new();
        let journal = factory.journal();
        let dir = tempdir().unwrap();
        let path = dir.path().join(PREFERENCES_FILE);
        let mut ctx = AppContext::new(factory, path.clone()).unwrap();
        ctx.navigate("example.com").unwrap();
        let id = ctx.tabs().current().unwrap().id();

        ctx.shutdown();
        ctx.shutdown();

        assert!(path.exists());
        assert!(ctx.tabs().is_empty());
        assert_eq!(journal.releases(), vec![id]);
    }
}
