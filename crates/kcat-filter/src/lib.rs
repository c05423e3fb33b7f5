//! Variant filtering for parameterized catalog items.
//!
//! Three stages: [`schema`] assigns each template attribute its SKU position,
//! [`decode`] pulls the attribute token out of a variant SKU, and
//! [`evaluate`] matches decoded tokens against the user's filter selection.
//! [`session`] ties them to asynchronously arriving catalog data.

pub mod decode;
pub mod evaluate;
pub mod pagination;
pub mod schema;
pub mod session;

pub use decode::{decode_token, DecodedTable, SkuLayout};
pub use evaluate::{
    evaluate_filter, filter_decoded, filter_variants, FilterSelection, FilterValue, MatchOutcome,
};
pub use pagination::{paginate, total_pages, PageWindow};
pub use schema::{resolve_schema, AttributePositions};
pub use session::{
    AttributeState, FilterSession, FilteredResult, Generation, LoadState, SessionHandle,
};
