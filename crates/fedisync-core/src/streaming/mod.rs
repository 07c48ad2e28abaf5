pub mod types;

pub use types::{parse_stream_event, StreamEvent, StreamFrame};
