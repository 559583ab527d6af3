//! Job-title lookup: text folding, tiered scoring and the cached referential.

pub mod catalog;
pub mod normalize;
pub mod ranker;
pub mod router;

pub use catalog::{
    CachedCatalog, CatalogError, CatalogSource, CsvCatalogSource, JobTitle, JobTitleCache,
    RankedJobTitle, StaticCatalogSource,
};
pub use normalize::normalize;
pub use ranker::{clamp_limit, rank, score_title, DEFAULT_LIMIT, MAX_LIMIT};
pub use router::search_router;
