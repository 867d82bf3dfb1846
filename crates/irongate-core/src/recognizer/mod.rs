//! Entity recognition: the regex recognizer, plugin trait and built-in
//! client-matter recognizer, the merging registry, and the shared
//! overlap-resolution walk both stages use.

mod overlap;
mod plugin;
mod regex_recognizer;
mod registry;

pub use overlap::{c1_priority, c2_priority, dedupe_exact, resolve_overlaps};
pub use plugin::{run_with_deadline, ClientMatterRecognizer, Recognizer, RECOGNIZER_DEADLINE};
pub use regex_recognizer::{byte_to_char_offset, char_slice, RegexRecognizer};
pub use registry::RecognizerRegistry;
