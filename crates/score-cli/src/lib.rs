//! Library side of the `score-report` binary: logging setup, input helpers,
//! the JSON-lines history sink and table rendering.

pub mod history;
pub mod input;
pub mod logging;
pub mod render;
