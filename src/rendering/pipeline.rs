//! Composition pipeline
//!
//! Owns the current preview and drives each render through
//! background load → layout → paint. A render with a background image is
//! split in two: [`Pipeline::submit`] hands back a [`RenderTicket`] naming
//! the image to fetch, and [`Pipeline::complete`] paints once the bytes
//! arrive. Every submit bumps a generation counter; completions for older
//! generations are dropped, so the most recently submitted request always
//! wins regardless of load order.

use super::canvas::Canvas;
use super::font::{get_typeface_with_config, Typeface, TypefaceMeasure};
use super::layout::{paint_plan, plan_layout, Frame};
use super::loader::{encode_data_url, ImageLoader, ImageSource};
use super::request::RenderRequest;
use crate::engine::config::Config;
use crate::engine::error::{ExportError, LoadError};
use crate::engine::measure::CachedMeasure;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Preview lifecycle as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    /// Nothing submitted yet
    Idle,
    /// Waiting for a background image
    Loading,
    /// A bitmap is available
    Ready,
    /// No typeface could be acquired; nothing will ever be drawn
    Unavailable,
}

/// Claim on a pending background load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTicket {
    generation: u64,
    source: ImageSource,
}

impl RenderTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }
}

/// Outcome of [`Pipeline::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// No image was requested; the preview is already painted
    Painted,
    /// Load `ticket.source()` and pass the result to [`Pipeline::complete`]
    Pending(RenderTicket),
    Unavailable,
}

/// Encoded thumbnail ready to be saved or displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ExportArtifact {
    /// `data:image/png;base64,...` form of the artifact
    pub fn to_data_url(&self) -> String {
        encode_data_url("image/png", &self.bytes)
    }

    /// Write the artifact into `dir` under its file name
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf, ExportError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        log::info!("exported {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Typeface plus the cached measurer built on it
struct Surface {
    face: Arc<dyn Typeface>,
    measure: CachedMeasure<TypefaceMeasure>,
}

pub struct Pipeline {
    config: Config,
    surface: Option<Surface>,
    generation: u64,
    pending: Option<(u64, RenderRequest)>,
    state: PreviewState,
    bitmap: Option<RgbaImage>,
    painted: Option<RenderRequest>,
    last_export_millis: u128,
}

impl Pipeline {
    /// Build a pipeline on the configured system font. When no font can be
    /// loaded the pipeline is created in the `Unavailable` state.
    pub fn new(config: Config) -> Self {
        match get_typeface_with_config(&config.font) {
            Ok(face) => Self::with_typeface(config, Arc::new(face)),
            Err(err) => {
                log::warn!("preview unavailable: {}", err);
                Self::unavailable(config)
            }
        }
    }

    pub fn with_typeface(config: Config, face: Arc<dyn Typeface>) -> Self {
        let measure = CachedMeasure::new(TypefaceMeasure::new(Arc::clone(&face)));
        Self {
            surface: Some(Surface { face, measure }),
            ..Self::unavailable(config)
        }
        .idle()
    }

    /// A pipeline with no drawing surface
    pub fn unavailable(config: Config) -> Self {
        Self {
            config,
            surface: None,
            generation: 0,
            pending: None,
            state: PreviewState::Unavailable,
            bitmap: None,
            painted: None,
            last_export_millis: 0,
        }
    }

    fn idle(mut self) -> Self {
        self.state = PreviewState::Idle;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> PreviewState {
        self.state
    }

    pub fn current_generation(&self) -> u64 {
        self.generation
    }

    /// Name of the typeface in use, if any
    pub fn typeface_name(&self) -> Option<&str> {
        self.surface.as_ref().map(|surface| surface.face.name())
    }

    pub fn current_bitmap(&self) -> Option<&RgbaImage> {
        self.bitmap.as_ref()
    }

    /// The request behind the current bitmap
    pub fn painted_request(&self) -> Option<&RenderRequest> {
        self.painted.as_ref()
    }

    /// Start rendering `request`. Supersedes every earlier submission.
    pub fn submit(&mut self, request: RenderRequest) -> Submission {
        let Some(surface) = self.surface.as_ref() else {
            return Submission::Unavailable;
        };
        // widths are only reused within one render
        surface.measure.clear();

        self.generation += 1;
        match request.background_image.clone() {
            None => {
                self.pending = None;
                self.paint(request, None);
                Submission::Painted
            }
            Some(source) => {
                log::debug!("generation {} waiting on {}", self.generation, source);
                self.pending = Some((self.generation, request));
                self.state = PreviewState::Loading;
                Submission::Pending(RenderTicket {
                    generation: self.generation,
                    source,
                })
            }
        }
    }

    /// Finish the render behind `ticket` with the outcome of its load.
    ///
    /// Returns `false` without touching the preview when the ticket has been
    /// superseded. A failed load still paints, using the text-only plan.
    pub fn complete(&mut self, ticket: RenderTicket, result: Result<DynamicImage, LoadError>) -> bool {
        let request = match self.pending.take() {
            Some((generation, request)) if generation == ticket.generation => request,
            other => {
                self.pending = other;
                log::warn!(
                    "discarding stale load of {} (generation {}, current {})",
                    ticket.source,
                    ticket.generation,
                    self.generation
                );
                return false;
            }
        };

        let image = match result {
            Ok(image) => Some(image),
            Err(err) => {
                log::warn!("background unavailable, rendering text only: {}", err);
                None
            }
        };
        self.paint(request, image.as_ref());
        true
    }

    /// Submit and, when needed, load synchronously through `loader`
    pub fn render_with(&mut self, request: RenderRequest, loader: &dyn ImageLoader) -> PreviewState {
        if let Submission::Pending(ticket) = self.submit(request) {
            let result = loader.load(ticket.source());
            self.complete(ticket, result);
        }
        self.state
    }

    fn paint(&mut self, request: RenderRequest, image: Option<&DynamicImage>) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };

        let canvas_config = &self.config.canvas;
        let frame = Frame::new(canvas_config.width, canvas_config.height, canvas_config.line_height);
        let plan = plan_layout(&request, image.is_some(), frame, &surface.measure, &self.config.palette);

        let mut canvas = Canvas::new(canvas_config.width, canvas_config.height, plan.base_fill);
        paint_plan(
            &mut canvas,
            &plan,
            image.filter(|_| plan.background.uses_image()),
            surface.face.as_ref(),
            &surface.measure,
            canvas_config.line_height,
        );

        log::info!(
            "rendered {} layout ({}), generation {}",
            request.layout,
            if image.is_some() { "with background" } else { "text only" },
            self.generation
        );
        self.bitmap = Some(canvas.into_image());
        self.painted = Some(request);
        self.state = PreviewState::Ready;
    }

    /// PNG bytes of the current preview, without the export gate
    pub fn encoded_preview(&self) -> Option<Vec<u8>> {
        let bitmap = self.bitmap.as_ref()?;
        match encode_png(bitmap) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::warn!("preview encoding failed: {}", err);
                None
            }
        }
    }

    /// Whether the painted request carries the fields an export needs
    pub fn can_export(&self) -> bool {
        self.painted.as_ref().is_some_and(RenderRequest::can_export)
    }

    /// Encode the current preview as a named PNG artifact.
    ///
    /// Refused until the painted request has both a non-blank author and a
    /// reference.
    pub fn export(&mut self) -> Result<ExportArtifact, ExportError> {
        let request = self.painted.as_ref().ok_or(ExportError::NothingRendered)?;
        let (author_missing, reference_missing) = request.missing_export_fields();
        if author_missing || reference_missing {
            return Err(ExportError::MissingRequiredFields {
                author_missing,
                reference_missing,
            });
        }

        let bitmap = self.bitmap.as_ref().ok_or(ExportError::NothingRendered)?;
        let (width, height) = bitmap.dimensions();
        let bytes = encode_png(bitmap)?;
        let stamp = self.next_export_stamp();

        Ok(ExportArtifact {
            file_name: format!("{}-{}.png", self.config.export.file_prefix, stamp),
            bytes,
            width,
            height,
        })
    }

    /// Wall-clock milliseconds, bumped so two exports never share a name
    fn next_export_stamp(&mut self) -> u128 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or(0);
        let stamp = now.max(self.last_export_millis + 1);
        self.last_export_millis = stamp;
        stamp
    }
}

fn encode_png(bitmap: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    bitmap
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|err| ExportError::Encode(err.to_string()))?;
    Ok(bytes)
}
