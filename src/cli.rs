//! CLI domain: parse, route, output, and presentation only.
//! Generation itself lives in the generator; the route table only wires
//! configuration, reader and writer together.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, GenerateArgs};
pub use presentation::{format_report_json, format_report_text};
pub use route::RunContext;
