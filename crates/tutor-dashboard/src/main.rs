mod bootstrap;

use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use dashboard_core::settings::{LastUsedParams, Settings};
use dashboard_runtime::DashboardSession;
use dashboard_ui::app::{App, Page};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;

    // The TUI owns the terminal, so it always logs to a file.
    let log_file = match (&settings.log_file, &settings.export) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(_)) => None,
        (None, None) => Some(bootstrap::default_log_path()),
    };
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("Tutor Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Institution: {}",
        settings.view,
        settings.theme,
        settings.institution
    );

    let secret = settings.require_secret()?.to_string();
    let mut session = DashboardSession::new(&settings.engagement_data, &settings.test_data);

    if let Some(path) = &settings.export {
        return export(&mut session, &secret, settings.student.as_deref(), path);
    }

    let app = App::new(
        &settings.theme,
        Page::from_name(&settings.view),
        settings.institution.clone(),
        session,
        secret,
    )
    .with_preferred_student(settings.student.clone());

    // In raw mode Ctrl+C arrives as a key press; SIGINT sent from elsewhere
    // raises the shutdown flag so the loop still restores the terminal.
    let shutdown = app.shutdown_handle();
    let mut ui = tokio::task::spawn_blocking(move || app.run());
    let selected = tokio::select! {
        joined = &mut ui => joined??,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
            shutdown.store(true, Ordering::Relaxed);
            ui.await??
        }
    };

    if let Some(student) = selected {
        let mut params = LastUsedParams::from(&settings);
        params.student = Some(student);
        if let Err(e) = params.save() {
            tracing::warn!(error = %e, "could not persist last-used parameters");
        }
    }

    Ok(())
}

/// Authenticate with a credential read from stdin and write a JSON snapshot.
fn export(
    session: &mut DashboardSession,
    secret: &str,
    student: Option<&str>,
    path: &Path,
) -> Result<()> {
    let mut credential = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut credential)
        .context("reading credential from stdin")?;
    let credential = credential.trim_end_matches(['\r', '\n']);

    session.authenticate(credential, secret)?;
    session.select_preferred(student);

    session.snapshot()?.write_to(path)?;
    tracing::info!(path = %path.display(), "snapshot written");
    println!("Snapshot written to {}", path.display());
    Ok(())
}
