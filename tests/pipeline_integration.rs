use image::{DynamicImage, Rgba, RgbaImage};
use std::collections::HashMap;
use std::sync::Arc;
use thumbforge::engine::config::Config;
use thumbforge::engine::error::{ExportError, LoadError};
use thumbforge::engine::reference::ScriptureReference;
use thumbforge::rendering::{
    BlockFace, ImageLoader, ImageSource, LayoutKind, Pipeline, PreviewState, RenderRequest, SourceLoader,
    Submission,
};

/// Serves images from memory; anything else is missing
struct MemoryLoader {
    images: HashMap<ImageSource, DynamicImage>,
}

impl MemoryLoader {
    fn new() -> Self {
        Self { images: HashMap::new() }
    }

    fn with(mut self, name: &str, color: [u8; 4]) -> Self {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 9, Rgba(color)));
        self.images.insert(ImageSource::parse(name), image);
        self
    }
}

impl ImageLoader for MemoryLoader {
    fn load(&self, source: &ImageSource) -> Result<DynamicImage, LoadError> {
        self.images
            .get(source)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(source.to_string()))
    }
}

fn pipeline() -> Pipeline {
    Pipeline::with_typeface(Config::default(), Arc::new(BlockFace::default()))
}

fn full_request(layout: LayoutKind) -> RenderRequest {
    RenderRequest::new(layout)
        .with_background(ImageSource::parse("sky.png"))
        .with_title("Walking in Grace Through Every Season of Life")
        .with_reference(ScriptureReference::range("John", 3, 16, 18))
        .with_date("2024-05-05")
        .with_author("Pastor Smith")
}

#[test]
fn every_layout_renders_at_full_size() {
    let loader = MemoryLoader::new().with("sky.png", [40, 90, 160, 255]);

    for layout in LayoutKind::ALL {
        let mut pipeline = pipeline();
        let state = pipeline.render_with(full_request(layout), &loader);
        assert_eq!(state, PreviewState::Ready, "{} did not render", layout);

        let bitmap = pipeline.current_bitmap().unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (1280, 720));
    }
}

#[test]
fn rendering_is_idempotent() {
    let loader = MemoryLoader::new().with("sky.png", [40, 90, 160, 255]);
    let mut pipeline = pipeline();

    pipeline.render_with(full_request(LayoutKind::SideModern), &loader);
    let first = pipeline.encoded_preview().unwrap();
    pipeline.render_with(full_request(LayoutKind::SideModern), &loader);
    let second = pipeline.encoded_preview().unwrap();

    assert_eq!(first, second, "same request must produce identical bytes");
}

#[test]
fn failed_image_degrades_to_text_only() {
    let request = RenderRequest::new(LayoutKind::Overlay)
        .with_background(ImageSource::parse("/nonexistent/thumbforge/missing.png"))
        .with_title("Grace")
        .with_author("Smith");

    let mut degraded = pipeline();
    assert_eq!(degraded.render_with(request.clone(), &SourceLoader::default()), PreviewState::Ready);

    let mut text_only = pipeline();
    let mut without_image = request;
    without_image.background_image = None;
    text_only.submit(without_image);

    assert_eq!(
        degraded.current_bitmap().unwrap(),
        text_only.current_bitmap().unwrap(),
        "a failed load must look exactly like the text-only composition"
    );
    assert_eq!(
        *degraded.current_bitmap().unwrap().get_pixel(1279, 719),
        Config::default().palette.base_fill
    );
}

#[test]
fn superseded_load_is_ignored() {
    let loader = MemoryLoader::new()
        .with("a.png", [255, 0, 0, 255])
        .with("b.png", [0, 0, 255, 255]);
    let mut pipeline = pipeline();

    let request_a = RenderRequest::new(LayoutKind::Minimal).with_background(ImageSource::parse("a.png"));
    let request_b = RenderRequest::new(LayoutKind::Minimal).with_background(ImageSource::parse("b.png"));

    let Submission::Pending(ticket_a) = pipeline.submit(request_a) else {
        panic!("expected a pending load for a.png");
    };
    let Submission::Pending(ticket_b) = pipeline.submit(request_b.clone()) else {
        panic!("expected a pending load for b.png");
    };

    // B arrives first, A straggles in afterwards
    let result_b = loader.load(ticket_b.source());
    assert!(pipeline.complete(ticket_b, result_b));
    let shown = pipeline.current_bitmap().unwrap().clone();

    let result_a = loader.load(ticket_a.source());
    assert!(!pipeline.complete(ticket_a, result_a));
    assert_eq!(pipeline.current_bitmap().unwrap(), &shown);
    assert_eq!(pipeline.painted_request(), Some(&request_b));

    // left edge is outside the corner box, so it shows the image itself
    let pixel = shown.get_pixel(5, 360);
    assert!(pixel.0[2] > 200 && pixel.0[0] == 0, "expected blue background, got {:?}", pixel);
}

#[test]
fn export_requires_author_and_reference() {
    let mut pipeline = pipeline();
    let loader = SourceLoader::default();

    pipeline.render_with(RenderRequest::new(LayoutKind::Overlay).with_title("Grace"), &loader);
    assert!(matches!(
        pipeline.export(),
        Err(ExportError::MissingRequiredFields {
            author_missing: true,
            reference_missing: true
        })
    ));

    pipeline.render_with(
        RenderRequest::new(LayoutKind::Overlay)
            .with_reference(ScriptureReference::new("John", 3, 16))
            .with_author("Smith"),
        &loader,
    );
    let artifact = pipeline.export().unwrap();
    assert!(artifact.file_name.starts_with("thumbnail-"));

    let decoded = image::load_from_memory(&artifact.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1280, 720));
}

#[test]
fn missing_font_leaves_preview_unavailable() {
    let mut config = Config::default();
    config.font.custom_font_path = None;
    config.font.search_paths = vec!["/nonexistent/thumbforge/font.ttf".into()];

    let mut pipeline = Pipeline::new(config);
    assert_eq!(pipeline.state(), PreviewState::Unavailable);
    assert_eq!(
        pipeline.render_with(RenderRequest::default().with_title("Grace"), &SourceLoader::default()),
        PreviewState::Unavailable
    );
    assert!(pipeline.current_bitmap().is_none());
}

#[test]
fn every_layout_renders_opaque() {
    let loader = MemoryLoader::new().with("sky.png", [40, 90, 160, 255]);

    for layout in LayoutKind::ALL {
        let mut with_image = pipeline();
        with_image.render_with(full_request(layout), &loader);

        let mut text_only = pipeline();
        let mut request = full_request(layout);
        request.background_image = None;
        text_only.submit(request);

        for (label, rendered) in [("image", &with_image), ("text-only", &text_only)] {
            let bitmap = rendered.current_bitmap().unwrap();
            let translucent = bitmap.pixels().filter(|p| p.0[3] != 255).count();
            assert_eq!(translucent, 0, "{} {} left {} translucent pixels", layout, label, translucent);
        }
    }
}

#[test]
fn image_load_superseded_by_text_only_request() {
    let loader = MemoryLoader::new().with("a.png", [255, 0, 0, 255]);
    let mut pipeline = pipeline();

    let request_a = RenderRequest::new(LayoutKind::Overlay).with_background(ImageSource::parse("a.png"));
    let request_b = RenderRequest::new(LayoutKind::Overlay).with_title("Grace");

    let Submission::Pending(ticket_a) = pipeline.submit(request_a) else {
        panic!("expected a pending load for a.png");
    };
    assert!(matches!(pipeline.submit(request_b.clone()), Submission::Painted));
    assert_eq!(pipeline.state(), PreviewState::Ready);
    let shown = pipeline.current_bitmap().unwrap().clone();

    let result_a = loader.load(ticket_a.source());
    assert!(!pipeline.complete(ticket_a, result_a), "late load must not repaint");
    assert_eq!(pipeline.current_bitmap().unwrap(), &shown);
    assert_eq!(pipeline.painted_request(), Some(&request_b));
    assert_eq!(pipeline.state(), PreviewState::Ready);
}
