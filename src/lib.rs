//! Sketchgrid
//!
//! Turns batches of rectangle instructions into character-cell drawings and
//! stores them under generated identifiers.
//!
//! # Features
//!
//! - **Compositing engine**: pure, re-entrant rasterization of rectangles with
//!   outline/fill rules and "blank never erases" layering (see [`canvas`])
//! - **Storage**: in-memory or file-backed repositories keyed by drawing id
//! - **HTTP server** (default `server` feature): `POST /` and `GET /{id}`
//!
//! # Example
//!
//! ```
//! use sketchgrid::canvas::{draw, RectSpec};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let specs = vec![
//!     RectSpec::new(0, 0, 3, 3).with_fill('🔥'),
//!     RectSpec::new(0, 2, 3, 1).with_fill('💧'),
//! ];
//! assert_eq!(draw(&specs)?, "🔥🔥🔥\n🔥🔥🔥\n💧💧💧");
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

pub mod error;
pub use error::{Error, Result};

pub mod canvas;
pub mod request;
pub mod service;
pub mod store;

// Async-friendly wrapper around the service (worker thread + oneshot replies)
pub mod async_api;

// HTTP surface
#[cfg(feature = "server")]
pub mod server;

pub use async_api::AsyncCanvas;
pub use canvas::{draw, RectSpec, Symbol};
pub use request::{DrawRequest, DrawRequests, DrawResponse};
pub use service::{CanvasService, ServiceOptions};
pub use store::{Drawing, FileRepository, MemoryRepository, Repository};

/// Configuration for the drawing server
///
/// Defaults listen on every interface at port 8080, keep drawings in memory
/// and use one worker per CPU.
///
/// # Examples
///
/// ```
/// let cfg = sketchgrid::ServerConfig::default();
/// assert_eq!(cfg.port, 8080);
/// assert!(cfg.data_dir.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// TCP port to bind (0 picks a free port)
    pub port: u16,
    /// Directory for file-backed storage; `None` keeps drawings in memory
    pub data_dir: Option<PathBuf>,
    /// HTTP worker threads, also used for parallel rasterization
    pub workers: usize,
    /// Batch size from which layers are rasterized in parallel
    pub parallel_threshold: usize,
    /// Maximum `width * height` of a single drawing
    pub max_canvas_cells: usize,
    /// Maximum rectangles times canvas cells rasterized for one request
    pub max_batch_cells: usize,
    /// Reject non-ASCII fill/outline symbols
    pub ascii_only: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: None,
            workers: num_cpus::get().max(1),
            parallel_threshold: 8,
            max_canvas_cells: canvas::MAX_CANVAS_CELLS,
            max_batch_cells: canvas::MAX_BATCH_CELLS,
            ascii_only: true,
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with `APP_HOST`, `APP_PORT`, `SKETCH_DATA_DIR` and
    /// `SKETCH_WORKERS` from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(host) = lookup("APP_HOST").filter(|h| !h.is_empty()) {
            cfg.host = host;
        }
        if let Some(port) = lookup("APP_PORT").filter(|p| !p.is_empty()) {
            cfg.port = port
                .parse()
                .map_err(|_| Error::ConfigError(format!("APP_PORT '{port}' is not a port number")))?;
        }
        if let Some(dir) = lookup("SKETCH_DATA_DIR").filter(|d| !d.is_empty()) {
            cfg.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(workers) = lookup("SKETCH_WORKERS").filter(|w| !w.is_empty()) {
            cfg.workers = workers
                .parse()
                .map_err(|_| Error::ConfigError(format!("SKETCH_WORKERS '{workers}' is not a number")))?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::ConfigError("workers must be at least 1".to_string()));
        }
        if self.max_canvas_cells == 0 {
            return Err(Error::ConfigError("max_canvas_cells must be at least 1".to_string()));
        }
        if self.max_batch_cells < self.max_canvas_cells {
            return Err(Error::ConfigError(
                "max_batch_cells must be at least max_canvas_cells".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` string suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            workers: self.workers,
            parallel_threshold: self.parallel_threshold,
            max_canvas_cells: self.max_canvas_cells,
            max_batch_cells: self.max_batch_cells,
            ascii_only: self.ascii_only,
        }
    }

    /// Open the repository selected by `data_dir`.
    pub fn open_repository(&self) -> Result<Arc<dyn Repository>> {
        let repository: Arc<dyn Repository> = match &self.data_dir {
            Some(dir) => Arc::new(FileRepository::open(dir)?),
            None => Arc::new(MemoryRepository::new()),
        };
        Ok(repository)
    }

    /// Build a service from this configuration.
    pub fn build_service(&self) -> Result<CanvasService> {
        Ok(CanvasService::new(self.open_repository()?, self.service_options()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert!(config.workers >= 1);
        assert!(config.ascii_only);
    }

    #[test]
    fn env_overrides_defaults() {
        let cfg = ServerConfig::from_lookup(env(&[
            ("APP_PORT", "9000"),
            ("APP_HOST", "127.0.0.1"),
            ("SKETCH_DATA_DIR", "/tmp/drawings"),
            ("SKETCH_WORKERS", "3"),
        ]))
        .unwrap();
        assert_eq!(cfg.bind_addr(), "127.0.0.1:9000");
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/tmp/drawings")));
        assert_eq!(cfg.workers, 3);
    }

    #[test]
    fn bad_port_is_a_config_error() {
        let err = ServerConfig::from_lookup(env(&[("APP_PORT", "http")])).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let err = ServerConfig::from_lookup(env(&[("SKETCH_WORKERS", "0")])).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn batch_budget_below_canvas_budget_is_rejected() {
        let cfg = ServerConfig {
            max_canvas_cells: 100,
            max_batch_cells: 99,
            ..ServerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::ConfigError(_))));
        assert!(ServerConfig { max_batch_cells: 100, ..cfg }.validate().is_ok());
    }
}
