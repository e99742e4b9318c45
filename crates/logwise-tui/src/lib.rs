//! logwise TUI: ratatui application shell.
//!
//! The dashboard lists projects and sessions; each opened session becomes an
//! investigation tab. Backend calls run on the caller's tokio runtime.

pub mod app;
pub mod commands;
pub mod event;
pub mod pages;
pub mod tasks;
pub mod theme;
pub mod widgets;

pub use app::App;

use logwise_client::BackendClient;
use logwise_core::config::Config;
use tokio::runtime::Handle;

/// Start the TUI and block until the user quits.
pub fn run(config: Config, client: BackendClient, runtime: Handle) -> anyhow::Result<()> {
    let theme = match theme::Theme::builtin(&config.ui.theme) {
        Ok(theme) => theme,
        Err(err) => {
            tracing::warn!(error = %err, "falling back to default theme");
            theme::Theme::builtin("default")?
        }
    };
    tracing::info!(backend = %client.base_url(), "starting tui");
    let tasks = tasks::Tasks::new(runtime, client);
    App::new(config, theme, tasks).run()
}
