// Desktop shell: Tauri window, menu, and the glue between the chrome
// frontend, the child webviews and the AppContext.

pub mod commands;
pub mod webview;

use std::collections::VecDeque;
use std::sync::{Mutex, TryLockError};

use tauri::menu::{MenuBuilder, MenuItemBuilder, PredefinedMenuItem, SubmenuBuilder};
use tauri::{App, AppHandle, Emitter, Manager, WindowEvent};
use tauri_plugin_clipboard_manager::ClipboardExt;

use crate::modules::chrome::DEFAULT_BAR_HEIGHT;
use crate::modules::tabs::CloseOutcome;
use crate::modules::view::ViewEvent;
use crate::settings::{Preferences, PREFERENCES_FILE};
use crate::state::{AppContext, MAX_TAB_NUMBER};
use webview::WebviewFactory;

pub type ShellContext = AppContext<WebviewFactory>;

pub struct Shell {
    ctx: Mutex<ShellContext>,
    // Engine events waiting for the context, in the order the engine sent them.
    pending: Mutex<VecDeque<ViewEvent>>,
}

impl Shell {
    fn new(ctx: ShellContext) -> Self {
        Self {
            ctx: Mutex::new(ctx),
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Runs `f` against the context, applies queued engine events, then
    /// brings the child webviews and the chrome up to date.
    pub fn update<T>(&self, app: &AppHandle, f: impl FnOnce(&mut ShellContext) -> T) -> Result<T, String> {
        let mut ctx = self.ctx.lock().map_err(|e| e.to_string())?;
        let out = f(&mut ctx);
        self.apply_pending(&mut ctx);
        sync_views(&ctx);
        emit_tabs(app, &ctx);
        Ok(out)
    }

    fn enqueue(&self, event: ViewEvent) {
        match self.pending.lock() {
            Ok(mut pending) => pending.push_back(event),
            Err(e) => log::error!("[Shell] Event queue poisoned: {}", e),
        }
    }

    fn apply_pending(&self, ctx: &mut ShellContext) {
        let events: Vec<ViewEvent> = match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => return,
        };
        for event in &events {
            ctx.dispatch(event);
        }
    }

    /// Applies queued events unless the context is busy; whoever holds it
    /// drains the queue before releasing it.
    fn drain(&self, app: &AppHandle) {
        match self.ctx.try_lock() {
            Ok(mut ctx) => {
                self.apply_pending(&mut ctx);
                sync_views(&ctx);
                emit_tabs(app, &ctx);
            }
            Err(TryLockError::WouldBlock) => {}
            Err(TryLockError::Poisoned(e)) => log::error!("[Shell] Context lock poisoned: {}", e),
        }
    }

    pub fn read<T>(&self, f: impl FnOnce(&ShellContext) -> T) -> Result<T, String> {
        let ctx = self.ctx.lock().map_err(|e| e.to_string())?;
        Ok(f(&ctx))
    }

    /// Mutates the context without touching the webviews or the chrome.
    pub fn with_context<T>(&self, f: impl FnOnce(&mut ShellContext) -> T) -> Result<T, String> {
        let mut ctx = self.ctx.lock().map_err(|e| e.to_string())?;
        Ok(f(&mut ctx))
    }

    fn shutdown(&self) {
        match self.ctx.lock() {
            Ok(mut ctx) => ctx.shutdown(),
            Err(e) => log::error!("[Shell] Context lock poisoned at shutdown: {}", e),
        }
    }
}

/// Shows only the current tab's webview and fits every webview above the bar.
fn sync_views(ctx: &ShellContext) {
    let bar_height = ctx.preferences().bottom_bar_height.unwrap_or(DEFAULT_BAR_HEIGHT);
    let bounds = ctx.tabs().factory().content_bounds(bar_height);
    let current = ctx.tabs().current_index();

    for (index, tab) in ctx.tabs().iter().enumerate() {
        if let Some(view) = tab.view() {
            if let Some(bounds) = bounds {
                view.set_bounds(bounds);
            }
            view.set_visible(index == current);
        }
    }
}

fn emit_tabs(app: &AppHandle, ctx: &ShellContext) {
    if let Err(e) = app.emit("update-tabs", ctx.snapshot()) {
        log::warn!("[Shell] Failed to emit update-tabs: {}", e);
    }
}

/// Queues an engine event and schedules a drain on the main thread, where it
/// is applied by tab identity. Events for tabs closed in the meantime are
/// dropped there.
pub(crate) fn forward_event(app: &AppHandle, event: ViewEvent) {
    let Some(shell) = app.try_state::<Shell>() else {
        return;
    };
    shell.enqueue(event);

    let handle = app.clone();
    let scheduled = app.run_on_main_thread(move || {
        if let Some(shell) = handle.try_state::<Shell>() {
            shell.drain(&handle);
        }
    });
    if let Err(e) = scheduled {
        log::warn!("[Shell] Failed to schedule view event drain: {}", e);
    }
}

/// Closes a tab; closing the last one shuts the application down.
pub(crate) fn close_tab(app: &AppHandle, shell: &Shell, index: Option<usize>) -> Result<(), String> {
    let outcome = shell.update(app, |ctx| match index {
        Some(index) => ctx.close_tab(index),
        None => ctx.close_current_tab(),
    })?;
    if outcome == CloseOutcome::Terminate {
        quit(app, shell);
    }
    Ok(())
}

fn quit(app: &AppHandle, shell: &Shell) {
    shell.shutdown();
    app.exit(0);
}

pub(crate) fn copy_current_url(app: &AppHandle, shell: &Shell) -> Result<(), String> {
    if let Some(url) = shell.read(|ctx| ctx.current_url())? {
        app.clipboard().write_text(url).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// What a menu item or its accelerator asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    NewTab,
    NewNotes,
    NewSketch,
    CloseTab,
    Reload,
    GoBack,
    GoForward,
    GoHome,
    CopyUrl,
    SelectNumber(usize),
}

impl MenuAction {
    fn from_id(id: &str) -> Option<Self> {
        let action = match id {
            "new_tab" => Self::NewTab,
            "new_notes" => Self::NewNotes,
            "new_sketch" => Self::NewSketch,
            "close_tab" => Self::CloseTab,
            "reload" | "reload_f5" => Self::Reload,
            "go_back" => Self::GoBack,
            "go_forward" => Self::GoForward,
            "go_home" => Self::GoHome,
            "copy_url" => Self::CopyUrl,
            other => Self::SelectNumber(other.strip_prefix("select_tab_")?.parse().ok()?),
        };
        Some(action)
    }

    fn perform(self, app: &AppHandle, shell: &Shell) -> Result<(), String> {
        let flatten = |r: crate::error::Result<usize>| r.map(drop).map_err(|e| e.to_string());
        match self {
            Self::NewTab => shell.update(app, |ctx| ctx.new_tab(None)).and_then(flatten),
            Self::NewNotes => shell.update(app, |ctx| ctx.new_notes_tab()).and_then(flatten),
            Self::NewSketch => shell.update(app, |ctx| ctx.new_sketch_tab()).and_then(flatten),
            Self::CloseTab => close_tab(app, shell, None),
            Self::Reload => shell.update(app, |ctx| ctx.reload()),
            Self::GoBack => shell.update(app, |ctx| ctx.go_back()),
            Self::GoForward => shell.update(app, |ctx| ctx.go_forward()),
            Self::GoHome => shell.update(app, |ctx| ctx.go_home()).and_then(flatten),
            Self::CopyUrl => copy_current_url(app, shell),
            Self::SelectNumber(number) => shell.update(app, |ctx| ctx.select_tab_number(number)).map(drop),
        }
    }
}

/// Runs `f` off the main thread. Menu and window events arrive on the main
/// thread, which must stay free to create and resize child webviews while
/// the context is locked elsewhere.
fn spawn_with_shell(app: &AppHandle, what: &'static str, f: impl FnOnce(&AppHandle, &Shell) -> Result<(), String> + Send + 'static) {
    let app = app.clone();
    tauri::async_runtime::spawn_blocking(move || {
        let Some(shell) = app.try_state::<Shell>() else {
            return;
        };
        if let Err(e) = f(&app, &shell) {
            log::warn!("[Shell] {} failed: {}", what, e);
        }
    });
}

fn build_menu(app: &App) -> tauri::Result<()> {
    let isle_menu = SubmenuBuilder::new(app, "Isle")
        .item(&PredefinedMenuItem::about(app, Some("About Isle Browser"), None)?)
        .separator()
        .item(&PredefinedMenuItem::quit(app, Some("Quit Isle Browser"))?)
        .build()?;

    let file_menu = SubmenuBuilder::new(app, "File")
        .item(&MenuItemBuilder::with_id("new_tab", "New Tab").accelerator("CmdOrCtrl+T").build(app)?)
        .item(&MenuItemBuilder::with_id("new_notes", "New Notes Tab").build(app)?)
        .item(&MenuItemBuilder::with_id("new_sketch", "New Sketch Tab").build(app)?)
        .separator()
        .item(&MenuItemBuilder::with_id("close_tab", "Close Tab").accelerator("CmdOrCtrl+W").build(app)?)
        .build()?;

    let edit_menu = SubmenuBuilder::new(app, "Edit")
        .item(&PredefinedMenuItem::undo(app, Some("Undo"))?)
        .item(&PredefinedMenuItem::redo(app, Some("Redo"))?)
        .separator()
        .item(&PredefinedMenuItem::cut(app, Some("Cut"))?)
        .item(&PredefinedMenuItem::copy(app, Some("Copy"))?)
        .item(&PredefinedMenuItem::paste(app, Some("Paste"))?)
        .item(&PredefinedMenuItem::select_all(app, Some("Select All"))?)
        .build()?;

    let view_menu = SubmenuBuilder::new(app, "View")
        .item(&MenuItemBuilder::with_id("reload", "Reload Page").accelerator("CmdOrCtrl+R").build(app)?)
        .item(&MenuItemBuilder::with_id("reload_f5", "Reload Page (F5)").accelerator("F5").build(app)?)
        .item(&MenuItemBuilder::with_id("copy_url", "Copy Page Address").accelerator("CmdOrCtrl+Shift+C").build(app)?)
        .build()?;

    let history_menu = SubmenuBuilder::new(app, "History")
        .item(&MenuItemBuilder::with_id("go_back", "Back").accelerator("CmdOrCtrl+[").build(app)?)
        .item(&MenuItemBuilder::with_id("go_forward", "Forward").accelerator("CmdOrCtrl+]").build(app)?)
        .item(&MenuItemBuilder::with_id("go_home", "Home").accelerator("CmdOrCtrl+,").build(app)?)
        .build()?;

    let tab_items = (1..=MAX_TAB_NUMBER)
        .map(|number| {
            MenuItemBuilder::with_id(format!("select_tab_{}", number), format!("Tab {}", number))
                .accelerator(format!("CmdOrCtrl+{}", number))
                .build(app)
        })
        .collect::<tauri::Result<Vec<_>>>()?;
    let mut tabs_menu = SubmenuBuilder::new(app, "Tabs");
    for item in &tab_items {
        tabs_menu = tabs_menu.item(item);
    }
    let tabs_menu = tabs_menu.build()?;

    let menu = MenuBuilder::new(app)
        .items(&[&isle_menu, &file_menu, &edit_menu, &view_menu, &history_menu, &tabs_menu])
        .build()?;
    app.set_menu(menu)?;

    app.on_menu_event(|app_handle, event| {
        let Some(action) = MenuAction::from_id(event.id().0.as_str()) else {
            return;
        };
        spawn_with_shell(app_handle, "Menu action", move |app, shell| action.perform(app, shell));
    });

    Ok(())
}

pub fn run() {
    tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::default()
                .level(log::LevelFilter::Info)
                .build(),
        )
        .plugin(tauri_plugin_clipboard_manager::init())
        .setup(|app| {
            let window = app
                .get_window("main")
                .ok_or("main window missing from tauri.conf.json")?;
            let preferences_path = match app.path().app_data_dir() {
                Ok(dir) => dir.join(PREFERENCES_FILE),
                Err(e) => {
                    log::warn!("[Shell] No app data dir ({}), using the config dir", e);
                    Preferences::default_path()?
                }
            };

            let factory = WebviewFactory::new(app.handle().clone(), window);
            let ctx = AppContext::new(factory, preferences_path)?;
            app.manage(Shell::new(ctx));

            build_menu(app)?;
            Ok(())
        })
        .on_window_event(|window, event| {
            if window.label() != "main" {
                return;
            }
            let app = window.app_handle();
            let Some(shell) = app.try_state::<Shell>() else {
                return;
            };
            match event {
                WindowEvent::Resized(_) => {
                    spawn_with_shell(app, "Resizing views", |app, shell| shell.update(app, |_| ()));
                }
                WindowEvent::Destroyed => shell.shutdown(),
                _ => {}
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_tabs,
            commands::new_tab,
            commands::new_notes_tab,
            commands::new_sketch_tab,
            commands::close_tab,
            commands::select_tab,
            commands::reorder_tabs,
            commands::navigate,
            commands::go_home,
            commands::go_back,
            commands::go_forward,
            commands::reload,
            commands::update_notes,
            commands::get_preferences,
            commands::save_preferences,
            commands::copy_current_url,
            commands::close_window,
            commands::minimize_window,
            commands::toggle_maximize,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
