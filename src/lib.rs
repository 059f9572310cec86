// Isle Browser library entry point.
// The tab core is pure logic and builds without a webview engine; the Tauri
// shell sits behind the `shell` feature.

pub mod error;
pub mod history;
pub mod settings;

// Application context
pub mod state;

// Pure logic modules (no Tauri imports)
pub mod modules;

#[cfg(feature = "shell")]
pub mod shell;

#[cfg(feature = "shell")]
pub use shell::run;
