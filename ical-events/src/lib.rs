mod digest;
mod error;
mod normalize;
mod output;
mod parser;
mod recurrence;
mod structs;

pub use digest::{digest, Digest};
pub use error::Error;
pub use normalize::{describe, normalize, UNTITLED};
pub use output::{from_json, output_path, to_json, write_collection};
pub use parser::parse_feed;
pub use recurrence::{expand, Occurrence, Window};
pub use structs::{EventCollection, EventTime, NormalizedEvent, RawEvent};
