pub mod canvas;
pub mod font;
pub mod layout;
pub mod loader;
pub mod pipeline;
pub mod request;

pub use canvas::{Area, Canvas, GradientAxis, TextAlign};
pub use font::{get_typeface_with_config, BlockFace, OutlineFace, Typeface, TypefaceMeasure};
pub use layout::{plan_layout, BackgroundPlan, DrawingPlan, LayoutKind, LineSpec, TextBlock};
pub use loader::{DataUrlLoader, FileLoader, ImageLoader, ImageSource, SourceLoader};
pub use pipeline::{ExportArtifact, Pipeline, PreviewState, RenderTicket, Submission};
pub use request::RenderRequest;
