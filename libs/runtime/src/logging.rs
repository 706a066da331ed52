use crate::config::{LoggingConfig, Section};
use std::{
    collections::HashMap,
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::Level;
use tracing_subscriber::{filter::FilterFn, fmt};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_MAX_SIZE_MB: u64 = 10;
const DEFAULT_MAX_BACKUPS: usize = 3;

// -------- level helpers --------
fn parse_tracing_level(s: &str) -> Option<tracing::Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

type CrateFilter = FilterFn<Box<dyn Fn(&tracing::Metadata<'_>) -> bool + Send + Sync + 'static>>;

/// Catch-all filter: passes records that no explicit section claims.
fn default_filter_excluding(crate_names: &[String], max_level: tracing::Level) -> CrateFilter {
    let crates = crate_names.to_vec();
    FilterFn::new(Box::new(move |meta: &tracing::Metadata<'_>| {
        let t = meta.target();
        if crates.iter().any(|c| matches_crate_prefix(t, c)) {
            return false;
        }
        meta.level() <= &max_level
    }))
}

/// Returns true if target == crate_name or target starts with "crate_name::"
fn matches_crate_prefix(target: &str, crate_name: &str) -> bool {
    target == crate_name
        || (target.starts_with(crate_name) && target[crate_name.len()..].starts_with("::"))
}

// -------- rotating writer for files --------
#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl RotWriter {
    fn handle(&self) -> RotWriterHandle {
        RotWriterHandle(self.0.clone())
    }
}

struct RotWriterHandle(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file writer poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file writer poisoned"))?
            .flush()
    }
}

// Drops writes when no file is routed for a target.
struct RoutedWriterHandle(Option<RotWriterHandle>);

impl Write for RoutedWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Routes log records to different files by target prefix
/// (e.g. "clinic_client" → logs/client.log).
#[derive(Clone)]
struct FileRouter {
    default: Option<RotWriter>,
    by_prefix: HashMap<String, RotWriter>,
}

impl FileRouter {
    fn resolve_for(&self, target: &str) -> Option<RotWriterHandle> {
        self.by_prefix
            .iter()
            .find(|(name, _)| matches_crate_prefix(target, name))
            .map(|(_, w)| w.handle())
            .or_else(|| self.default.as_ref().map(RotWriter::handle))
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = RoutedWriterHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriterHandle(self.default.as_ref().map(RotWriter::handle))
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriterHandle(self.resolve_for(meta.target()))
    }
}

struct ConfigData<'a> {
    default_section: Option<&'a Section>,
    crate_sections: Vec<(String, &'a Section)>,
    crate_names: Vec<String>,
}

fn extract_config_data(cfg: &LoggingConfig) -> ConfigData<'_> {
    let crate_sections = cfg
        .iter()
        .filter(|(k, _)| k.as_str() != "default")
        .map(|(k, v)| (k.clone(), v))
        .collect::<Vec<_>>();

    let crate_names = crate_sections.iter().map(|(n, _)| n.clone()).collect();

    ConfigData {
        default_section: cfg.get("default"),
        crate_sections,
        crate_names,
    }
}

/// Resolve a log file path against `base_dir` (the session home dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn create_rotating_writer_at_path(
    log_path: &Path,
    max_bytes: usize,
    max_files: usize,
) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::MaxFiles(max_files)),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn file_writer_for(name: &str, section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }

    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let max_files = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);
    let log_path = resolve_log_path(&section.file, base_dir);

    match create_rotating_writer_at_path(&log_path, max_bytes as usize, max_files) {
        Ok(writer) => Some(writer),
        Err(e) => {
            eprintln!(
                "Failed to init log file for '{}': {} ({})",
                name,
                log_path.to_string_lossy(),
                e
            );
            None
        }
    }
}

fn build_file_router(config: &ConfigData, base_dir: &Path) -> FileRouter {
    let default = config
        .default_section
        .and_then(|s| file_writer_for("default", s, base_dir));

    let by_prefix = config
        .crate_sections
        .iter()
        .filter_map(|(name, section)| {
            file_writer_for(name, section, base_dir).map(|w| (name.clone(), w))
        })
        .collect();

    FileRouter { default, by_prefix }
}

fn build_targets(
    config: &ConfigData,
    level_of: impl Fn(&Section) -> &str,
    require_file: bool,
) -> tracing_subscriber::filter::Targets {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::filter::Targets;

    let mut targets = Targets::new().with_default(LevelFilter::OFF);
    for (crate_name, section) in &config.crate_sections {
        if require_file && section.file.trim().is_empty() {
            continue;
        }
        if let Some(level) = parse_tracing_level(level_of(section)).map(LevelFilter::from_level) {
            targets = targets.with_target(crate_name.clone(), level);
        }
    }
    targets
}

/// Initialize logging from a configuration.
/// - `cfg`: logging sections keyed by crate target, plus "default"
/// - `base_dir`: base directory used to resolve relative log file paths
///
/// Console output goes to stderr so command output on stdout stays parseable.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, prelude::*, Layer, Registry};

    // Bridge `log` → `tracing` before installing the subscriber
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let config = extract_config_data(cfg);
    let router = build_file_router(&config, base_dir);
    let ansi = std::io::stderr().is_terminal();

    let console_explicit = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(build_targets(&config, |s| s.console_level.as_str(), false));

    let console_default = config
        .default_section
        .and_then(|s| parse_tracing_level(&s.console_level))
        .map(|level| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(ansi)
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_filter(default_filter_excluding(&config.crate_names, level))
        });

    let (file_explicit, file_default) = if router.is_empty() {
        (None, None)
    } else {
        let explicit = fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router.clone())
            .with_filter(build_targets(&config, |s| s.file_level.as_str(), true));

        let default = match (router.default.is_some(), config.default_section) {
            (true, Some(section)) => parse_tracing_level(&section.file_level).map(|level| {
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_writer(router.clone())
                    .with_filter(default_filter_excluding(&config.crate_names, level))
            }),
            _ => None,
        };
        (Some(explicit), default)
    };

    let _ = Registry::default()
        .with(console_explicit)
        .with(console_default)
        .with(file_explicit)
        .with(file_default)
        .try_init();
}

fn init_default_logging() {
    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_max_level(Level::WARN)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}
