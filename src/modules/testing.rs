// Test doubles for the view contract.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::history::NavHistory;
use crate::modules::view::{EmbeddedView, TabId, ViewEventKind, ViewFactory, ViewId};

/// Shared log of view lifecycle calls, readable after the views are gone.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<(TabId, &'static str)>>>);

impl Journal {
    fn record(&self, tab: TabId, what: &'static str) {
        self.0.borrow_mut().push((tab, what));
    }

    pub fn releases(&self) -> Vec<TabId> {
        self.0
            .borrow()
            .iter()
            .filter(|(_, what)| *what == "release")
            .map(|(tab, _)| *tab)
            .collect()
    }

    pub fn reloads(&self) -> usize {
        self.0.borrow().iter().filter(|(_, what)| *what == "reload").count()
    }
}

pub struct FakeView {
    tab: TabId,
    history: NavHistory,
    title: String,
    journal: Journal,
}

impl EmbeddedView for FakeView {
    fn navigate(&mut self, url: &str) {
        self.history.visit(url);
        self.title.clear();
    }

    fn go_back(&mut self) {
        self.history.step_back();
    }

    fn go_forward(&mut self) {
        self.history.step_forward();
    }

    fn reload(&mut self) {
        self.journal.record(self.tab, "reload");
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
        self.journal.record(self.tab, "release");
    }
}

#[derive(Default)]
pub struct FakeFactory {
    journal: Journal,
    fail: bool,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl ViewFactory for FakeFactory {
    type View = FakeView;

    fn create(&mut self, tab: TabId, _view: ViewId, url: &str) -> Result<FakeView> {
        if self.fail {
            return Err(Error::View {
                tab,
                reason: "engine unavailable".to_string(),
            });
        }
        let mut history = NavHistory::new();
        history.visit(url);
        Ok(FakeView {
            tab,
            history,
            title: String::new(),
            journal: self.journal.clone(),
        })
    }
}
