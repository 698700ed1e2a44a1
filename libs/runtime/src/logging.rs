use crate::config::{LoggingConfig, Section};
use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::Targets,
    fmt,
    layer::{Layer, SubscriberExt},
    registry::Registry,
    util::SubscriberInitExt,
};

use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};

const DEFAULT_SECTION: &str = "default";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

// -------- level helpers --------

fn parse_level_filter(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        "" => LevelFilter::INFO,
        _ => LevelFilter::INFO,
    }
}

// -------- rotating writer for files --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendCount>>>);

impl<'a> fmt::MakeWriter<'a> for RotWriter {
    type Writer = RotWriter;
    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for RotWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log writer poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log writer poisoned"))?
            .flush()
    }
}

/// Resolve a log file path against `base_dir` (server home_dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Create a size-rotated writer, ensuring the parent directory exists.
fn create_rotating_writer(section: &Section, base_dir: &Path) -> std::io::Result<RotWriter> {
    let log_path = resolve_log_path(&section.file, base_dir);
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let max_bytes = section.max_size_mb.unwrap_or(100) * 1024 * 1024;
    let rot = FileRotate::new(
        &log_path,
        AppendCount::new(section.max_backups.unwrap_or(3)),
        ContentLimit::BytesSurpassed(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

// -------- filters --------

/// Console filter: the default section sets the catch-all level; every other
/// section overrides the level for its target prefix.
fn console_targets(cfg: &LoggingConfig) -> Targets {
    let default_level = cfg
        .get(DEFAULT_SECTION)
        .map(|s| parse_level_filter(&s.console_level))
        .unwrap_or(LevelFilter::INFO);

    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .fold(Targets::new().with_default(default_level), |t, (name, s)| {
            t.with_target(name.clone(), parse_level_filter(&s.console_level))
        })
}

/// File filter for one section. The default file receives everything except
/// targets that own a dedicated file.
fn file_targets(cfg: &LoggingConfig, name: &str, section: &Section) -> Targets {
    let level = parse_level_filter(&section.file_level);
    if name != DEFAULT_SECTION {
        return Targets::new()
            .with_default(LevelFilter::OFF)
            .with_target(name.to_string(), level);
    }

    cfg.iter()
        .filter(|(n, s)| n.as_str() != DEFAULT_SECTION && !s.file.trim().is_empty())
        .fold(Targets::new().with_default(level), |t, (n, _)| {
            t.with_target(n.clone(), LevelFilter::OFF)
        })
}

fn build_layers(cfg: &LoggingConfig, base_dir: &Path) -> Vec<BoxedLayer> {
    let ansi = std::io::stdout().is_terminal();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    layers.push(
        fmt::layer()
            .with_ansi(ansi)
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(console_targets(cfg))
            .boxed(),
    );

    for (name, section) in cfg {
        if section.file.trim().is_empty() {
            continue;
        }
        match create_rotating_writer(section, base_dir) {
            Ok(writer) => layers.push(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_target(true)
                    .with_level(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_writer(writer)
                    .with_filter(file_targets(cfg, name, section))
                    .boxed(),
            ),
            Err(e) => eprintln!(
                "Failed to init log file for '{}': {} ({})",
                name,
                resolve_log_path(&section.file, base_dir).display(),
                e
            ),
        }
    }

    layers
}

// -------- public init --------

/// Initialize logging from configuration.
/// - `cfg`: logging sections keyed by target prefix ("default" is the catch-all)
/// - `base_dir`: base directory for relative log file paths (server.home_dir)
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` → `tracing` before installing the subscriber
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let _ = tracing_subscriber::registry()
        .with(build_layers(cfg, base_dir))
        .try_init();
}

fn init_default_logging() {
    let _ = fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(parse_level_filter("trace"), LevelFilter::TRACE);
        assert_eq!(parse_level_filter("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level_filter(" Info "), LevelFilter::INFO);
        assert_eq!(parse_level_filter("warn"), LevelFilter::WARN);
        assert_eq!(parse_level_filter("ERROR"), LevelFilter::ERROR);
        assert_eq!(parse_level_filter("off"), LevelFilter::OFF);
        assert_eq!(parse_level_filter("none"), LevelFilter::OFF);
        assert_eq!(parse_level_filter("bogus"), LevelFilter::INFO);
    }

    #[test]
    fn test_console_targets_override_per_crate() {
        let mut cfg = default_logging_config();
        cfg.insert("registrations".into(), section("trace", "", ""));
        cfg.insert("sqlx".into(), section("off", "", ""));

        let targets = console_targets(&cfg);

        assert!(targets.would_enable("registrations::domain", &tracing::Level::TRACE));
        assert!(!targets.would_enable("sqlx::query", &tracing::Level::ERROR));
        assert!(targets.would_enable("hyper", &tracing::Level::INFO));
        assert!(!targets.would_enable("hyper", &tracing::Level::DEBUG));
    }

    #[test]
    fn test_default_file_excludes_crates_with_own_file() {
        let mut cfg = LoggingConfig::new();
        cfg.insert(
            DEFAULT_SECTION.into(),
            section("info", "logs/all.log", "debug"),
        );
        cfg.insert(
            "registrations".into(),
            section("info", "logs/registrations.log", "warn"),
        );

        let default_targets = file_targets(&cfg, DEFAULT_SECTION, &cfg[DEFAULT_SECTION]);
        assert!(default_targets.would_enable("tower_http", &tracing::Level::DEBUG));
        assert!(!default_targets.would_enable("registrations", &tracing::Level::ERROR));

        let own = file_targets(&cfg, "registrations", &cfg["registrations"]);
        assert!(own.would_enable("registrations::api", &tracing::Level::WARN));
        assert!(!own.would_enable("registrations::api", &tracing::Level::INFO));
        assert!(!own.would_enable("tower_http", &tracing::Level::ERROR));
    }

    #[test]
    fn test_file_paths_resolved_against_home_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));

        let abs = tmp.path().join("abs.log");
        assert_eq!(resolve_log_path(&abs.to_string_lossy(), Path::new("/x")), abs);
    }

    #[test]
    fn test_rotating_writer_creates_parent() {
        let tmp = tempdir().unwrap();
        let s = section("info", "nested/dir/app.log", "debug");

        let mut writer = create_rotating_writer(&s, tmp.path()).expect("writer");
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();

        assert!(tmp.path().join("nested/dir").is_dir());
        assert!(tmp.path().join("nested/dir/app.log").exists());
    }

    #[test]
    fn test_layers_skip_sections_without_file() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert(DEFAULT_SECTION.into(), section("info", "", ""));
        cfg.insert("registrations".into(), section("debug", "logs/r.log", "debug"));

        let layers = build_layers(&cfg, tmp.path());

        // console + one file layer
        assert_eq!(layers.len(), 2);
    }
}
