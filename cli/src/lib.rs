//! Building blocks for the `lexibattle` terminal game: a JSON word-file
//! backend, two question-type plugins and console sinks.

mod backend;
mod console;
mod plugins;
mod stage;

pub use backend::JsonFileBackend;
pub use console::{ConsoleRender, ScoreBoard};
pub use plugins::{plugin_table, MultipleChoice, Spelling};
pub use stage::{Answerable, Stage, Verdict};
