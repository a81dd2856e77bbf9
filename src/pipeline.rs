//! Asynchronous render pipeline.
//!
//! Each render pass (layout + rasterize + highlight) runs on its own
//! background thread against an immutable `Arc<FileTree>` and a private
//! [`Layout`], so passes never share mutable state and cancellation simply
//! drops the partial result. Results come back over a channel and are
//! published by [`RenderPipeline::poll`] on the presentation thread, last
//! request wins: output from a superseded pass is discarded, never shown.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use crate::cancel::CancelToken;
use crate::hit;
use crate::layout::{self, Layout, PixRect};
use crate::options::RenderOptions;
use crate::render::colors::{Palette, Rgb};
use crate::render::cushion;
use crate::render::highlight;
use crate::render::pixels::PixelBuffer;
use crate::tree::arena::{FileTree, NodeId};

/// Quiet period before a resize actually triggers a render, so rapid
/// resize events coalesce into one pass.
const RESIZE_DEBOUNCE: Duration = Duration::from_millis(120);

/// Why a render was requested. Resizes are debounced; everything else
/// starts immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTrigger {
    Resize,
    DataChange,
    OptionsChange,
    Refresh,
}

/// At most one highlight layer per render.
#[derive(Debug, Clone)]
pub enum HighlightSpec {
    /// Mark an explicit set of nodes (selection).
    Selection(Vec<NodeId>),
    /// Mark every leaf of the given category.
    Category(u16),
}

/// Everything one render pass needs, captured at request time.
#[derive(Clone)]
pub struct RenderRequest {
    pub tree: Arc<FileTree>,
    pub root: NodeId,
    pub width: u32,
    pub height: u32,
    pub options: RenderOptions,
    pub palette: Palette,
    pub highlight: Option<HighlightSpec>,
    pub highlight_color: Rgb,
}

/// A completed render: base image, optional overlay, and the rectangle
/// assignment hover queries are served from.
pub struct RenderOutput {
    pub width: u32,
    pub height: u32,
    pub pixels: PixelBuffer,
    pub overlay: Option<PixelBuffer>,
    pub layout: Layout,
    pub tree: Arc<FileTree>,
    pub root: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Rendering,
}

enum WorkerMessage {
    Completed {
        generation: u64,
        output: Box<RenderOutput>,
    },
    Failed {
        generation: u64,
    },
}

/// Owns the background render passes and publishes their results.
///
/// Drive it from the presentation loop: `request` on every resize / data /
/// option change, `poll` once per frame (or timer tick) to start pending
/// work and pick up finished images.
pub struct RenderPipeline {
    result_tx: mpsc::Sender<WorkerMessage>,
    result_rx: mpsc::Receiver<WorkerMessage>,
    /// Debounced request waiting for its deadline.
    pending: Option<(RenderRequest, Instant)>,
    /// Token of the in-flight pass; cancelled on supersession.
    cancel: CancelToken,
    /// Monotonic pass counter; results from older generations are stale.
    generation: u64,
    rendering: bool,
    dimmed: bool,
    debounce: Duration,
    last_completed: Option<Arc<RenderOutput>>,
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPipeline {
    pub fn new() -> Self {
        let (result_tx, result_rx) = mpsc::channel();
        Self {
            result_tx,
            result_rx,
            pending: None,
            cancel: CancelToken::new(),
            generation: 0,
            rendering: false,
            dimmed: false,
            debounce: RESIZE_DEBOUNCE,
            last_completed: None,
        }
    }

    /// Override the resize quiet period (mostly for tests).
    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    /// Ask for a new render. A non-resize trigger starts the pass
    /// immediately, cancelling whatever is in flight.
    pub fn request(&mut self, trigger: RenderTrigger, request: RenderRequest) {
        self.dimmed = true;
        match trigger {
            RenderTrigger::Resize => {
                // Coalesce: only the newest pending request survives.
                self.pending = Some((request, Instant::now() + self.debounce));
            }
            _ => {
                self.pending = None;
                self.start_render(request);
            }
        }
    }

    /// Start pending work whose deadline has passed and drain finished
    /// results. Returns the newly published output, if any.
    pub fn poll(&mut self) -> Option<Arc<RenderOutput>> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|(_, deadline)| Instant::now() >= *deadline);
        if due {
            if let Some((request, _)) = self.pending.take() {
                self.start_render(request);
            }
        }

        let mut published = None;
        while let Ok(message) = self.result_rx.try_recv() {
            match message {
                WorkerMessage::Completed { generation, output } => {
                    if generation != self.generation {
                        tracing::debug!(
                            generation,
                            current = self.generation,
                            "discarding superseded render output"
                        );
                        continue;
                    }
                    let output = Arc::new(*output);
                    self.last_completed = Some(output.clone());
                    self.rendering = false;
                    self.dimmed = false;
                    published = Some(output);
                }
                WorkerMessage::Failed { generation } => {
                    if generation != self.generation {
                        continue;
                    }
                    // Keep showing the previous completed output; never a
                    // blank or corrupt frame.
                    self.rendering = false;
                    self.dimmed = false;
                }
            }
        }
        published
    }

    pub fn state(&self) -> PipelineState {
        if self.rendering || self.pending.is_some() {
            PipelineState::Rendering
        } else {
            PipelineState::Idle
        }
    }

    /// Busy indicator: true from request until the matching publish.
    pub fn dimmed(&self) -> bool {
        self.dimmed
    }

    /// The most recent completed output. Stable: an in-flight pass never
    /// modifies it.
    pub fn last_completed(&self) -> Option<&Arc<RenderOutput>> {
        self.last_completed.as_ref()
    }

    /// Hover query against the last completed rectangle assignment. Safe to
    /// call while a render is in flight.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<NodeId> {
        let output = self.last_completed.as_ref()?;
        hit::find_node_at(&output.tree, &output.layout, output.root, x, y)
    }

    fn start_render(&mut self, request: RenderRequest) {
        // Supersede: the in-flight pass stops at its next checkpoint and its
        // output (if it races past) is discarded by generation.
        self.cancel.cancel();
        self.cancel = CancelToken::new();
        self.generation += 1;
        self.rendering = true;

        let generation = self.generation;
        let token = self.cancel.clone();
        let tx = self.result_tx.clone();
        tracing::debug!(
            generation,
            width = request.width,
            height = request.height,
            "starting render pass"
        );

        std::thread::spawn(move || {
            match catch_unwind(AssertUnwindSafe(|| execute(&request, &token))) {
                Ok(Some(output)) => {
                    let _ = tx.send(WorkerMessage::Completed {
                        generation,
                        output: Box::new(output),
                    });
                }
                Ok(None) => {
                    // Cancelled: no output, no error.
                    tracing::debug!(generation, "render pass abandoned");
                }
                Err(_) => {
                    tracing::error!(generation, "render pass panicked");
                    let _ = tx.send(WorkerMessage::Failed { generation });
                }
            }
        });
    }
}

/// One full render pass. Returns `None` when cancelled.
fn execute(request: &RenderRequest, cancel: &CancelToken) -> Option<RenderOutput> {
    let start = Instant::now();
    let viewport = PixRect::new(0, 0, request.width as i32, request.height as i32);

    let layout = layout::compute_layout(
        &request.tree,
        request.root,
        viewport,
        &request.options,
        cancel,
    )?;

    let mut pixels = PixelBuffer::new(request.width, request.height);
    pixels.fill(if request.options.grid {
        request.options.grid_color.opaque()
    } else {
        cushion::BACKGROUND
    });
    if !cushion::rasterize(
        &mut pixels,
        &layout,
        &request.tree,
        &request.palette,
        &request.options,
        cancel,
    ) {
        return None;
    }

    let overlay = request.highlight.as_ref().map(|spec| {
        let mut overlay = PixelBuffer::new(request.width, request.height);
        match spec {
            HighlightSpec::Selection(nodes) => {
                highlight::draw_selection(&mut overlay, &layout, nodes, request.highlight_color)
            }
            HighlightSpec::Category(category) => highlight::draw_category(
                &mut overlay,
                &layout,
                &request.tree,
                *category,
                request.highlight_color,
            ),
        }
        overlay
    });

    tracing::info!(
        rects = layout.rects.len(),
        width = request.width,
        height = request.height,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "render pass completed"
    );

    Some(RenderOutput {
        width: request.width,
        height: request.height,
        pixels,
        overlay,
        layout,
        tree: request.tree.clone(),
        root: request.root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::pixels::Rgba;
    use crate::tree::aggregate;

    fn sample_tree() -> Arc<FileTree> {
        let mut tree = FileTree::new("root");
        let sub = tree.add_dir(tree.root, "sub");
        tree.add_leaf(sub, "a", 600, 0);
        tree.add_leaf(sub, "b", 150, 1);
        tree.add_leaf(tree.root, "c", 250, 2);
        aggregate::aggregate_sizes(&mut tree);
        aggregate::sort_children_by_size(&mut tree);
        Arc::new(tree)
    }

    fn request_for(tree: &Arc<FileTree>, width: u32, height: u32) -> RenderRequest {
        RenderRequest {
            tree: tree.clone(),
            root: tree.root,
            width,
            height,
            options: RenderOptions::default(),
            palette: Palette::default(),
            highlight: None,
            highlight_color: Rgb::new(255, 255, 0),
        }
    }

    fn poll_until_published(pipeline: &mut RenderPipeline) -> Arc<RenderOutput> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(output) = pipeline.poll() {
                return output;
            }
            assert!(Instant::now() < deadline, "render did not complete in time");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn refresh_renders_and_publishes() {
        let tree = sample_tree();
        let mut pipeline = RenderPipeline::new();
        assert_eq!(pipeline.state(), PipelineState::Idle);

        pipeline.request(RenderTrigger::Refresh, request_for(&tree, 120, 80));
        assert!(pipeline.dimmed());

        let output = poll_until_published(&mut pipeline);
        assert_eq!((output.width, output.height), (120, 80));
        assert!(!pipeline.dimmed());
        assert_eq!(pipeline.state(), PipelineState::Idle);
        // The whole viewport is covered by shaded leaves.
        assert!(output.pixels.pixels().iter().all(|&p| p.a == 255));

        // Hover queries are served from the published assignment.
        let hit = pipeline.hit_test(10, 10).expect("inside the viewport");
        assert!(tree.get(hit).is_leaf());
        assert_eq!(pipeline.hit_test(-5, 10), None);
    }

    #[test]
    fn newer_request_supersedes_older_output() {
        let tree = sample_tree();
        let mut pipeline = RenderPipeline::new();

        pipeline.request(RenderTrigger::Refresh, request_for(&tree, 300, 200));
        pipeline.request(RenderTrigger::OptionsChange, request_for(&tree, 64, 64));

        let output = poll_until_published(&mut pipeline);
        assert_eq!((output.width, output.height), (64, 64));

        // Give the superseded pass time to (maybe) finish, then confirm it
        // never surfaces.
        std::thread::sleep(Duration::from_millis(50));
        assert!(pipeline.poll().is_none());
        let last = pipeline.last_completed().unwrap();
        assert_eq!((last.width, last.height), (64, 64));
    }

    #[test]
    fn resize_requests_are_debounced_and_coalesced() {
        let tree = sample_tree();
        let mut pipeline = RenderPipeline::new();
        pipeline.set_debounce(Duration::from_millis(30));

        pipeline.request(RenderTrigger::Resize, request_for(&tree, 10, 10));
        pipeline.request(RenderTrigger::Resize, request_for(&tree, 20, 20));
        pipeline.request(RenderTrigger::Resize, request_for(&tree, 40, 30));

        // Inside the quiet period nothing starts.
        assert!(pipeline.poll().is_none());
        assert_eq!(pipeline.state(), PipelineState::Rendering);
        assert!(pipeline.dimmed());

        std::thread::sleep(Duration::from_millis(40));
        let output = poll_until_published(&mut pipeline);
        // Only the newest size was rendered.
        assert_eq!((output.width, output.height), (40, 30));
    }

    #[test]
    fn highlight_overlay_is_published_alongside_the_base_image() {
        let tree = sample_tree();
        let mut pipeline = RenderPipeline::new();
        let mut request = request_for(&tree, 100, 100);
        request.highlight = Some(HighlightSpec::Category(2));
        pipeline.request(RenderTrigger::Refresh, request);

        let output = poll_until_published(&mut pipeline);
        let overlay = output.overlay.as_ref().expect("overlay requested");
        assert!(overlay.pixels().iter().any(|&p| p.a == 255));
        assert!(overlay.pixels().iter().any(|&p| p == Rgba::TRANSPARENT));
    }
}
