//! Durable favorites and the override pipeline that keeps fetched
//! payloads consistent with them.

mod overrides;
mod store;

pub use overrides::OverridePipeline;
pub use store::{FavoriteUpdate, FavoritesStore};
