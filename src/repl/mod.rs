//! REPL (Read-Eval-Print Loop) module
//!
//! Line-oriented editing of the current render request.
//!
//! ## Module Structure
//!
//! - **command.rs**: Command definitions and how edits apply to a request
//! - **parser.rs**: Manual string parsing for `@` and `:` prefixes
//!
//! ## Usage in main.rs
//!
//! ```rust,ignore
//! let command = parser::parse_repl_input(&line);
//! if command.apply(&mut request) {
//!     pipeline.render_with(request.clone(), &loader);
//! }
//! ```

pub mod command;
pub mod parser;

pub use command::{Field, ReplCommand};
pub use parser::parse_repl_input;
