//! Canvas service: validate a batch, draw it, persist it.

use std::sync::Arc;

use log::{debug, info};

use crate::canvas;
use crate::request::{DrawRequests, DrawResponse};
use crate::store::{Drawing, Repository};
use crate::{Result, ServerConfig};

/// Tuning knobs for [`CanvasService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Threads available for rasterizing one batch
    pub workers: usize,
    /// Minimum batch size before rasterization is spread across threads
    pub parallel_threshold: usize,
    /// Upper bound on `width * height` of one drawing
    pub max_canvas_cells: usize,
    /// Upper bound on rectangles times canvas cells for one batch
    pub max_batch_cells: usize,
    /// Only accept ASCII fill/outline symbols
    pub ascii_only: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        ServerConfig::default().service_options()
    }
}

impl ServiceOptions {
    pub fn limits(&self) -> canvas::Limits {
        canvas::Limits {
            max_canvas_cells: self.max_canvas_cells,
            max_batch_cells: self.max_batch_cells,
        }
    }
}

/// Coordinates validation, drawing and storage.
#[derive(Clone)]
pub struct CanvasService {
    repository: Arc<dyn Repository>,
    options: ServiceOptions,
}

impl std::fmt::Debug for CanvasService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasService")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl CanvasService {
    pub fn new(repository: Arc<dyn Repository>, options: ServiceOptions) -> Self {
        Self {
            repository,
            options,
        }
    }

    pub fn options(&self) -> ServiceOptions {
        self.options
    }

    /// Render a batch without storing it.
    pub fn render(&self, requests: &DrawRequests) -> Result<String> {
        requests.validate(self.options.ascii_only)?;
        let specs = requests.to_specs();
        let (width, height) = canvas::bounding_box(&specs);
        debug!("drawing {} rectangles on a {}x{} canvas", specs.len(), width, height);

        if self.options.workers > 1 && specs.len() >= self.options.parallel_threshold {
            canvas::draw_parallel(&specs, self.options.workers, self.options.limits())
        } else {
            canvas::draw_with_limits(&specs, self.options.limits())
        }
    }

    /// Draw a batch and store the result under a fresh identifier.
    pub fn save(&self, requests: &DrawRequests) -> Result<DrawResponse> {
        let drawing = Drawing::new(self.render(requests)?);
        self.repository.save(&drawing)?;
        info!("saved drawing {} ({} rectangles)", drawing.id, requests.len());
        Ok(DrawResponse {
            id: drawing.id,
            canvas: drawing.drawing,
        })
    }

    pub fn get_by_id(&self, id: &str) -> Result<Drawing> {
        self.repository.get_by_id(id)
    }
}
