pub mod key;
pub mod manager;
pub mod snapshot;

pub use key::{CacheKey, CachePaths};
pub use manager::{plan_fetch, CacheManager, CacheProbe, ChartSave, FetchPlan, SaveReport};
