pub mod merge;
pub mod validation;

pub use merge::merge_matches;
pub use validation::{
    DigitKey, LookupRequest, PageCeiling, DEFAULT_PAGE_CEILING, MAX_PAGE_CEILING,
    MIN_PAGE_CEILING,
};
