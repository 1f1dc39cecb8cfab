//! Race-event search filters
//!
//! - `compiler` - query-string pairs to [`FilterExpression`]
//! - `types` - the filter tree and its JSON rendering

mod compiler;
mod types;

pub use compiler::{Operator, compile, is_date_field, is_relation_field};
pub use types::{DateTimeValue, FieldFilter, FieldFilters, FilterExpression, FilterValue, TextOp};

/// Pagination and sorting keys; never treated as filters
pub const SPECIAL_KEYS: &[&str] = &["page", "limit", "sortBy", "order"];

/// Fields that live on the related race rather than the event
pub const RELATION_SCOPED_FIELDS: &[&str] = &[
    "elevation",
    "length",
    "startLocation",
    "startDateTime",
    "endDateTime",
    "gpsFile",
    "competitionId",
];

/// Name of the one-to-many relation from event to races
pub const RELATION_NAME: &str = "races";

const TAGS_IN_KEY: &str = "tags_in";
const TAGS_FIELD: &str = "tags";
const COMPETITION_IDS_IN_KEY: &str = "competitionIds_in";
const COMPETITION_ID_FIELD: &str = "competitionId";

/// The only field whose `gte`/`lte` bounds are merged into one range
const MERGED_RANGE_FIELD: &str = "length";
