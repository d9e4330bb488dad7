pub mod tags;

pub use tags::{ParsedTask, parse_task};
