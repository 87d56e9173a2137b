pub mod media_item;
pub mod search;

pub use media_item::{ContentType, ItemId, MediaItem, NamedRef, PaymentType, RegionProviders};
pub use search::{FilterSelection, Limits, SearchParams, SearchRequest};
