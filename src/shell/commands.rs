// Commands invoked by the chrome frontend.
// Everything that touches the context is async: Tauri then runs it on the
// async runtime instead of the main thread. Creating a child webview from a
// synchronous command deadlocks on Windows, and a main thread blocked on the
// context lock could never service a webview being created elsewhere.

use tauri::{AppHandle, State, Window};

use super::Shell;
use crate::modules::chrome::ChromeSnapshot;
use crate::settings::Preferences;

#[tauri::command]
pub async fn get_tabs(state: State<'_, Shell>) -> Result<ChromeSnapshot, String> {
    state.read(|ctx| ctx.snapshot())
}

#[tauri::command]
pub async fn new_tab(app: AppHandle, state: State<'_, Shell>, url: Option<String>) -> Result<(), String> {
    state
        .update(&app, |ctx| ctx.new_tab(url.as_deref()))?
        .map(drop)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn new_notes_tab(app: AppHandle, state: State<'_, Shell>) -> Result<(), String> {
    state
        .update(&app, |ctx| ctx.new_notes_tab())?
        .map(drop)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn new_sketch_tab(app: AppHandle, state: State<'_, Shell>) -> Result<(), String> {
    state
        .update(&app, |ctx| ctx.new_sketch_tab())?
        .map(drop)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn close_tab(app: AppHandle, state: State<'_, Shell>, index: usize) -> Result<(), String> {
    super::close_tab(&app, &state, Some(index))
}

#[tauri::command]
pub async fn select_tab(app: AppHandle, state: State<'_, Shell>, index: usize) -> Result<(), String> {
    state.update(&app, |ctx| ctx.select_tab(index)).map(drop)
}

#[tauri::command]
pub async fn reorder_tabs(app: AppHandle, state: State<'_, Shell>, from: usize, to: usize) -> Result<(), String> {
    log::debug!("[Tab Reorder] {} -> {}", from, to);
    state.update(&app, |ctx| ctx.reorder_tabs(from, to)).map(drop)
}

#[tauri::command]
pub async fn navigate(app: AppHandle, state: State<'_, Shell>, input: String) -> Result<(), String> {
    state
        .update(&app, |ctx| ctx.navigate(&input))?
        .map(drop)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn go_home(app: AppHandle, state: State<'_, Shell>) -> Result<(), String> {
    state
        .update(&app, |ctx| ctx.go_home())?
        .map(drop)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn go_back(app: AppHandle, state: State<'_, Shell>) -> Result<(), String> {
    state.update(&app, |ctx| ctx.go_back())
}

#[tauri::command]
pub async fn go_forward(app: AppHandle, state: State<'_, Shell>) -> Result<(), String> {
    state.update(&app, |ctx| ctx.go_forward())
}

#[tauri::command]
pub async fn reload(app: AppHandle, state: State<'_, Shell>) -> Result<(), String> {
    state.update(&app, |ctx| ctx.reload())
}

#[tauri::command]
pub async fn update_notes(state: State<'_, Shell>, index: usize, text: String) -> Result<(), String> {
    // Typing must not re-render the chrome, so this skips `update`.
    state.with_context(|ctx| {
        ctx.update_notes(index, text);
    })
}

#[tauri::command]
pub async fn get_preferences(state: State<'_, Shell>) -> Result<Preferences, String> {
    state.read(|ctx| ctx.preferences().clone())
}

#[tauri::command]
pub async fn save_preferences(app: AppHandle, state: State<'_, Shell>, preferences: Preferences) -> Result<(), String> {
    state.update(&app, |ctx| ctx.update_preferences(preferences))
}

#[tauri::command]
pub async fn copy_current_url(app: AppHandle, state: State<'_, Shell>) -> Result<(), String> {
    super::copy_current_url(&app, &state)
}

// Window controls for the frameless window.

#[tauri::command]
pub fn close_window(window: Window) -> Result<(), String> {
    window.close().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn minimize_window(window: Window) -> Result<(), String> {
    window.minimize().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn toggle_maximize(window: Window) -> Result<(), String> {
    if window.is_maximized().map_err(|e| e.to_string())? {
        window.unmaximize().map_err(|e| e.to_string())
    } else {
        window.maximize().map_err(|e| e.to_string())
    }
}
