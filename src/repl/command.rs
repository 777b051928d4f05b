use crate::engine::reference::ScriptureReference;
use crate::rendering::layout::LayoutKind;
use crate::rendering::loader::ImageSource;
use crate::rendering::request::RenderRequest;
use std::fmt;
use std::str::FromStr;

/// Request field that `:clear` can reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Reference,
    Date,
    Author,
    Image,
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "title" => Ok(Field::Title),
            "ref" | "reference" => Ok(Field::Reference),
            "date" => Ok(Field::Date),
            "author" => Ok(Field::Author),
            "image" | "background" => Ok(Field::Image),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::Reference => "reference",
            Field::Date => "date",
            Field::Author => "author",
            Field::Image => "image",
        };
        f.write_str(name)
    }
}

/// Commands that can be parsed from REPL input
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// Switch to another layout
    SetLayout(LayoutKind),

    SetTitle(String),

    SetReference(ScriptureReference),

    SetDate(String),

    SetAuthor(String),

    /// Use an image file or data URL as the background
    SetBackground(String),

    /// Drop the background image
    ClearBackground,

    ClearField(Field),

    /// Write the current thumbnail to the output directory
    Export,

    /// Print the current request and preview state
    Status,

    /// Show help information
    Help,

    /// Quit the application
    Quit,

    /// Unknown/invalid command
    Unknown(String),
}

impl ReplCommand {
    /// True for commands that edit the request and so trigger a re-render
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            ReplCommand::SetLayout(_)
                | ReplCommand::SetTitle(_)
                | ReplCommand::SetReference(_)
                | ReplCommand::SetDate(_)
                | ReplCommand::SetAuthor(_)
                | ReplCommand::SetBackground(_)
                | ReplCommand::ClearBackground
                | ReplCommand::ClearField(_)
        )
    }

    /// Apply an edit command to `request`. Returns whether anything changed.
    pub fn apply(&self, request: &mut RenderRequest) -> bool {
        let before = request.clone();

        match self {
            ReplCommand::SetLayout(layout) => request.layout = *layout,
            ReplCommand::SetTitle(title) => request.title = Some(title.clone()),
            ReplCommand::SetReference(reference) => request.reference = Some(reference.clone()),
            ReplCommand::SetDate(date) => request.date = Some(date.clone()),
            ReplCommand::SetAuthor(author) => request.author = Some(author.clone()),
            ReplCommand::SetBackground(source) => {
                request.background_image = Some(ImageSource::parse(source))
            }
            ReplCommand::ClearBackground | ReplCommand::ClearField(Field::Image) => {
                request.background_image = None
            }
            ReplCommand::ClearField(Field::Title) => request.title = None,
            ReplCommand::ClearField(Field::Reference) => request.reference = None,
            ReplCommand::ClearField(Field::Date) => request.date = None,
            ReplCommand::ClearField(Field::Author) => request.author = None,
            ReplCommand::Export
            | ReplCommand::Status
            | ReplCommand::Help
            | ReplCommand::Quit
            | ReplCommand::Unknown(_) => return false,
        }

        *request != before
    }
}
