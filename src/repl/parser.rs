use super::command::{Field, ReplCommand};
use crate::engine::reference::parse_chapter_verse;
use crate::rendering::layout::LayoutKind;

/// Parse REPL input string into a command
///
/// Supports:
/// - `:layout <name>`, `:title <text>`, `:date <text>`, `:author <text>`
/// - `:ref <book> <chapter>:<verse>[-<end>]`
/// - `:clear <field>`, `:export`, `:status`
/// - `:q`/`:quit`, `:h`/`:help`
/// - `@<path or data URL>` → background image, bare `@` → no background
/// - anything else → Unknown
pub fn parse_repl_input(input: &str) -> ReplCommand {
    let input = input.trim();

    if input.is_empty() {
        return ReplCommand::Unknown(input.to_string());
    }

    if let Some(cmd) = input.strip_prefix(':') {
        let (name, argument) = match cmd.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (cmd, ""),
        };
        parse_system_command(name, argument).unwrap_or_else(|| ReplCommand::Unknown(input.to_string()))
    } else if let Some(rest) = input.strip_prefix('@') {
        let source = rest.trim();
        if source.is_empty() {
            ReplCommand::ClearBackground
        } else {
            ReplCommand::SetBackground(source.to_string())
        }
    } else {
        ReplCommand::Unknown(input.to_string())
    }
}

fn parse_system_command(name: &str, argument: &str) -> Option<ReplCommand> {
    let command = match (name, argument.is_empty()) {
        ("q" | "quit", true) => ReplCommand::Quit,
        ("h" | "help", true) => ReplCommand::Help,
        ("export", true) => ReplCommand::Export,
        ("status", true) => ReplCommand::Status,
        ("layout", false) => ReplCommand::SetLayout(argument.parse::<LayoutKind>().ok()?),
        ("title", false) => ReplCommand::SetTitle(argument.to_string()),
        ("date", false) => ReplCommand::SetDate(argument.to_string()),
        ("author", false) => ReplCommand::SetAuthor(argument.to_string()),
        ("ref", false) => {
            // the book name may itself contain spaces ("1 John", "Song of Songs")
            let (book, notation) = argument.rsplit_once(char::is_whitespace)?;
            ReplCommand::SetReference(parse_chapter_verse(book, notation)?)
        }
        ("clear", false) => ReplCommand::ClearField(argument.parse::<Field>().ok()?),
        _ => return None,
    };
    Some(command)
}
