//! The composer's input payload

use super::layout::LayoutKind;
use super::loader::ImageSource;
use crate::engine::reference::ScriptureReference;

/// Everything one composition is built from
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderRequest {
    pub layout: LayoutKind,
    pub background_image: Option<ImageSource>,
    pub title: Option<String>,
    pub reference: Option<ScriptureReference>,
    pub date: Option<String>,
    pub author: Option<String>,
}

/// A text field counts as set unless it is missing or empty.
/// Whitespace-only values are kept and render as blank rows.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

impl RenderRequest {
    pub fn new(layout: LayoutKind) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn with_background(mut self, source: ImageSource) -> Self {
        self.background_image = Some(source);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_reference(mut self, reference: ScriptureReference) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn title_text(&self) -> Option<&str> {
        present(&self.title)
    }

    pub fn date_text(&self) -> Option<&str> {
        present(&self.date)
    }

    pub fn author_text(&self) -> Option<&str> {
        present(&self.author)
    }

    /// Author and reference are both required before an export is allowed
    pub fn missing_export_fields(&self) -> (bool, bool) {
        let author_missing = self
            .author
            .as_deref()
            .map_or(true, |author| author.trim().is_empty());
        (author_missing, self.reference.is_none())
    }

    pub fn can_export(&self) -> bool {
        self.missing_export_fields() == (false, false)
    }
}
