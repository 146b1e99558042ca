pub mod logging;
pub mod text;

pub use text::{normalize_title, truncate_text};
