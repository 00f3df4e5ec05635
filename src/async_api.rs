use crate::canvas::composite::paint_over;
use crate::canvas::{self, rasterize, Cell, Grid, Limits, RectSpec};
use crate::request::{DrawRequests, DrawResponse};
use crate::store::Drawing;
use crate::{CanvasService, Error, Result};
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Save(DrawRequests, oneshot::Sender<Result<DrawResponse>>),
    Get(String, oneshot::Sender<Result<Drawing>>),
    Render(DrawRequests, oneshot::Sender<Result<String>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly canvas handle backed by a dedicated worker thread.
///
/// The worker thread owns the [`CanvasService`] and executes commands sent
/// from async tasks, so blocking storage backends never stall the runtime.
/// Handles are cheap to clone and all talk to the same worker.
#[derive(Clone)]
pub struct AsyncCanvas {
    cmd_tx: Sender<Command>,
}

impl std::fmt::Debug for AsyncCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncCanvas").finish_non_exhaustive()
    }
}

impl AsyncCanvas {
    /// Spawn the worker thread that owns `service`.
    pub async fn new(service: CanvasService) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx) = oneshot::channel::<Result<()>>();

        thread::Builder::new()
            .name("sketchgrid-canvas".to_string())
            .spawn(move || {
                let _ = init_tx.send(Ok(()));

                while let Ok(cmd) = cmd_rx.recv() {
                    match cmd {
                        Command::Save(requests, resp) => {
                            let _ = resp.send(service.save(&requests));
                        }
                        Command::Get(id, resp) => {
                            let _ = resp.send(service.get_by_id(&id));
                        }
                        Command::Render(requests, resp) => {
                            let _ = resp.send(service.render(&requests));
                        }
                        Command::Close(resp) => {
                            let _ = resp.send(Ok(()));
                            break;
                        }
                    }
                }
            })?;

        init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))??;

        Ok(Self { cmd_tx })
    }

    fn send(&self, cmd: Command) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| Error::Other("canvas worker has shut down".to_string()))
    }

    /// Validate, draw and store a batch.
    pub async fn save(&self, requests: DrawRequests) -> Result<DrawResponse> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Save(requests, tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Save canceled: {}", e)))?
    }

    /// Fetch a stored drawing.
    pub async fn get(&self, id: &str) -> Result<Drawing> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Get(id.to_string(), tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Get canceled: {}", e)))?
    }

    /// Validate and draw a batch without storing it.
    pub async fn render(&self, requests: DrawRequests) -> Result<String> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Render(requests, tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Render canceled: {}", e)))?
    }

    /// Shut down the worker. Other clones of this handle start failing.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Close(tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))?
    }
}

/// Draw `specs` with layers rasterized on the blocking pool, using the
/// default [`Limits`].
///
/// Specs are rasterized in windows of [`canvas::layers_in_flight`] tasks and
/// each window is merged in input order before the next is spawned, so the
/// output matches [`canvas::draw`] and only a bounded number of layers is
/// alive at once.
pub async fn draw_async(specs: Vec<RectSpec>) -> Result<String> {
    draw_async_with_limits(specs, num_cpus::get(), Limits::default()).await
}

/// [`draw_async`] with an explicit task count and limits.
pub async fn draw_async_with_limits(
    specs: Vec<RectSpec>,
    tasks: usize,
    limits: Limits,
) -> Result<String> {
    let (width, height) = canvas::checked_bounds(&specs, limits)?;
    let window = canvas::layers_in_flight(tasks, width, height);

    let mut merged = Grid::filled(width, height, Cell::Blank);
    let mut specs = specs.into_iter().peekable();
    while specs.peek().is_some() {
        let batch = specs.by_ref().take(window).map(|spec| {
            tokio::task::spawn_blocking(move || rasterize(&spec, width, height))
        });
        let layers = futures::future::try_join_all(batch)
            .await
            .map_err(|e| Error::Other(format!("Rasterization task failed: {}", e)))?;
        for layer in &layers {
            paint_over(&mut merged, layer);
        }
    }
    Ok(merged.to_text())
}
