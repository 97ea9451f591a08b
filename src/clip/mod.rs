pub mod item;
pub mod list;

pub use item::Clip;
pub use list::{ClipCollection, DEFAULT_MAX_RECENT_CLIPS, filter_and_sort};
