//! Logging setup
//!
//! Console output always; with a log directory, daily rotating files:
//! - `app/`   everything except audit and security events
//! - `audit/` tenant-scoped notification operations (target `audit`)
//! - `security/` tenant resolution failures (target `security`)

use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, filter::filter_fn, fmt, prelude::*};

const AUDIT_TARGET: &str = "audit";
const SECURITY_TARGET: &str = "security";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// `RUST_LOG` when set, `level` otherwise
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the global subscriber
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&str>) -> anyhow::Result<()> {
    let console: BoxedLayer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(env_filter(level))
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(env_filter(level))
            .boxed()
    };

    let mut layers = vec![console];
    if let Some(dir) = log_dir {
        layers.extend(file_layers(Path::new(dir), level)?);
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}

fn file_layers(log_dir: &Path, level: &str) -> anyhow::Result<Vec<BoxedLayer>> {
    let app_dir = log_dir.join("app");
    let audit_dir = log_dir.join(AUDIT_TARGET);
    let security_dir = log_dir.join(SECURITY_TARGET);
    for dir in [&app_dir, &audit_dir, &security_dir] {
        fs::create_dir_all(dir)?;
    }

    let app = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(RollingFileAppender::new(Rotation::DAILY, app_dir, "app"))
        .with_filter(env_filter(level))
        .with_filter(filter_fn(|meta| {
            meta.target() != AUDIT_TARGET && meta.target() != SECURITY_TARGET
        }))
        .boxed();

    let audit = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(RollingFileAppender::new(Rotation::DAILY, audit_dir, AUDIT_TARGET))
        .with_filter(filter_fn(|meta| meta.target() == AUDIT_TARGET))
        .boxed();

    let security = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(RollingFileAppender::new(
            Rotation::DAILY,
            security_dir,
            SECURITY_TARGET,
        ))
        .with_filter(filter_fn(|meta| meta.target() == SECURITY_TARGET))
        .boxed();

    Ok(vec![app, audit, security])
}
