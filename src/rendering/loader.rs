//! Background image sources and loaders
//!
//! The composer does not care where image bytes come from. Hosts hand it an
//! [`ImageSource`] and an [`ImageLoader`] that turns the source into a
//! decoded bitmap or a [`LoadError`].

use crate::engine::error::LoadError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::DynamicImage;
use std::fmt;
use std::path::PathBuf;

/// Where a background image comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// Image file on the local filesystem
    Path(PathBuf),
    /// `data:<mime>;base64,<payload>` URL
    DataUrl(String),
}

impl ImageSource {
    /// Classify a host-supplied identifier
    pub fn parse(identifier: &str) -> Self {
        let trimmed = identifier.trim();
        if trimmed.starts_with("data:") {
            ImageSource::DataUrl(trimmed.to_string())
        } else {
            ImageSource::Path(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(path) => write!(f, "{}", path.display()),
            ImageSource::DataUrl(url) => {
                let header = url.split(',').next().unwrap_or("data:");
                write!(f, "{},…", header)
            }
        }
    }
}

/// Turns an image source into a decoded bitmap
pub trait ImageLoader {
    fn load(&self, source: &ImageSource) -> Result<DynamicImage, LoadError>;
}

/// Reads and decodes files from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl ImageLoader for FileLoader {
    fn load(&self, source: &ImageSource) -> Result<DynamicImage, LoadError> {
        let ImageSource::Path(path) = source else {
            return Err(LoadError::NotFound(source.to_string()));
        };
        if !path.exists() {
            return Err(LoadError::NotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        decode(&bytes, &path.display().to_string())
    }
}

/// Decodes base64 `data:` URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlLoader;

impl ImageLoader for DataUrlLoader {
    fn load(&self, source: &ImageSource) -> Result<DynamicImage, LoadError> {
        let ImageSource::DataUrl(url) = source else {
            return Err(LoadError::InvalidDataUrl(source.to_string()));
        };
        let bytes = decode_data_url(url)?;
        decode(&bytes, &source.to_string())
    }
}

/// Dispatches each source kind to the loader that understands it
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceLoader {
    files: FileLoader,
    data_urls: DataUrlLoader,
}

impl ImageLoader for SourceLoader {
    fn load(&self, source: &ImageSource) -> Result<DynamicImage, LoadError> {
        match source {
            ImageSource::Path(_) => self.files.load(source),
            ImageSource::DataUrl(_) => self.data_urls.load(source),
        }
    }
}

fn decode(bytes: &[u8], source_name: &str) -> Result<DynamicImage, LoadError> {
    image::load_from_memory(bytes).map_err(|err| LoadError::Decode {
        source_name: source_name.to_string(),
        reason: err.to_string(),
    })
}

/// Payload bytes of a base64 data URL
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, LoadError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| LoadError::InvalidDataUrl("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| LoadError::InvalidDataUrl("missing payload separator".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(LoadError::InvalidDataUrl(format!(
            "only base64 payloads are supported, got {:?}",
            header
        )));
    }

    STANDARD
        .decode(payload.trim())
        .map_err(|err| LoadError::InvalidDataUrl(err.to_string()))
}

/// Wrap encoded image bytes as a data URL
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
