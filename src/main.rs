use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use clipdeck::app::AppState;
use clipdeck::cli::{Cli, Commands, Toggle};
use clipdeck::clip::Clip;
use clipdeck::config::Config;
use clipdeck::service::{ServiceThread, build_system_service};
use clipdeck::storage::SqliteSettings;
use clipdeck::store::ClipStore;
use clipdeck::ui::{self, theme::Theme};
use clipdeck::utils::paths::{ensure_directories_exist, get_log_path};
use clipdeck::utils::unicode::{single_line, truncate_to_width};
use dialoguer::Confirm;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

const LIST_TEXT_WIDTH: usize = 70;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            init_file_logging()?;
            let config = Config::load()?;
            run_tui(&config)
        }
        Some(command) => {
            init_stderr_logging();
            let config = Config::load()?;
            match command {
                Commands::Watch => handle_watch(&config),
                Commands::List { search } => handle_list(&config, search.as_deref()),
                Commands::Pin { text } => handle_pin(&config, &text),
                Commands::Delete { id, yes } => handle_delete(&config, &id, yes),
                Commands::Trim { state } => handle_trim(&config, state),
            }
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .init();
}

/// The terminal belongs to the UI, so its logs go to a file instead.
fn init_file_logging() -> Result<()> {
    ensure_directories_exist()?;
    let log_path = get_log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_tui(config: &Config) -> Result<()> {
    let service = ServiceThread::spawn(config)?;
    let state = AppState::new(service.handle.clone(), Theme::from_config(config));

    let result = ui::run_tui(state);
    if let Err(e) = &result {
        error!(error = %e, "Terminal UI exited with an error");
    }

    service.shutdown()?;
    result
}

fn handle_watch(config: &Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async {
        let (service, handle) = build_system_service(config)?;
        info!("Watching the clipboard, press Ctrl-C to stop");

        let run = service.run();
        tokio::pin!(run);

        tokio::select! {
            _ = &mut run => {}
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                info!("Interrupted, saving pinned clips");
                handle.shutdown();
                (&mut run).await;
            }
        }
        Ok::<(), anyhow::Error>(())
    })
}

fn open_store(config: &Config) -> Result<ClipStore> {
    let settings = SqliteSettings::open_default()?;
    Ok(ClipStore::load(
        Box::new(settings),
        config.max_recent_clips,
        config.save_debounce(),
    ))
}

fn handle_list(config: &Config, search: Option<&str>) -> Result<()> {
    let store = open_store(config)?;
    let clips = store.filtered_and_sorted(search.unwrap_or(""));

    if clips.is_empty() {
        println!("No pinned clips.");
        return Ok(());
    }

    for clip in &clips {
        println!("{}", list_line(clip));
    }

    Ok(())
}

fn list_line(clip: &Clip) -> String {
    format!(
        "{}  {}  {}",
        clip.short_id(),
        clip.date_added.format("%Y-%m-%d %H:%M"),
        truncate_to_width(&single_line(&clip.text), LIST_TEXT_WIDTH)
    )
}

fn handle_pin(config: &Config, text: &str) -> Result<()> {
    let mut store = open_store(config)?;
    let Some(id) = store.add_clip(text, true) else {
        bail!("Nothing to pin: text is blank");
    };
    store.flush();

    let short_id = store.get(id).map(Clip::short_id).unwrap_or_default();
    println!("✓ Pinned clip {short_id}");
    Ok(())
}

fn handle_delete(config: &Config, prefix: &str, yes: bool) -> Result<()> {
    let mut store = open_store(config)?;
    let clip = resolve_id_prefix(store.clips().clips(), prefix)?.clone();

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete \"{}\"?", truncate_to_width(&single_line(&clip.text), 40)))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete(clip.id);
    store.flush();
    println!("✓ Deleted clip {}", clip.short_id());
    Ok(())
}

fn handle_trim(config: &Config, state: Toggle) -> Result<()> {
    let mut store = open_store(config)?;
    store.set_trim_spaces(state.enabled())?;

    let label = if state.enabled() { "on" } else { "off" };
    println!("✓ Trimming spaces on new clips is {label}");
    Ok(())
}

/// Finds the single clip whose id starts with `prefix`. Hyphens are ignored.
fn resolve_id_prefix<'a>(clips: &'a [Clip], prefix: &str) -> Result<&'a Clip> {
    let needle = prefix.trim().replace('-', "").to_lowercase();
    if needle.is_empty() {
        bail!("Clip id must not be empty");
    }

    let mut matches = clips
        .iter()
        .filter(|clip| simple_id(clip.id).starts_with(&needle));

    match (matches.next(), matches.next()) {
        (Some(clip), None) => Ok(clip),
        (Some(_), Some(_)) => Err(anyhow!("Clip id '{prefix}' is ambiguous")),
        (None, _) => Err(anyhow!("No pinned clip with id '{prefix}'")),
    }
}

fn simple_id(id: Uuid) -> String {
    id.simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn clip_with_id(id: &str, text: &str) -> Clip {
        let mut clip = Clip::new(text.to_string(), true);
        clip.id = Uuid::parse_str(id).unwrap();
        clip
    }

    #[test]
    fn test_resolve_id_prefix() {
        let clips = vec![
            clip_with_id("3f2a0000-0000-4000-8000-000000000001", "one"),
            clip_with_id("3f2b0000-0000-4000-8000-000000000002", "two"),
        ];

        assert_eq!(resolve_id_prefix(&clips, "3F2A").unwrap().text, "one");
        assert_eq!(
            resolve_id_prefix(&clips, "3f2b0000-0000").unwrap().text,
            "two"
        );
        assert!(resolve_id_prefix(&clips, "3f2").is_err());
        assert!(resolve_id_prefix(&clips, "ffff").is_err());
        assert!(resolve_id_prefix(&clips, "  ").is_err());
    }

    #[test]
    fn test_list_line() {
        let mut clip = clip_with_id("3f2a0000-0000-4000-8000-000000000001", "multi\nline");
        clip.date_added = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();

        assert_eq!(list_line(&clip), "3f2a0000  2024-05-01 09:30  multi line");
    }
}
