pub mod errors;
mod extract;
pub mod model;

pub use errors::Rejection;
pub use extract::{extract_timestamp, inspect};
pub use model::{
    is_plausible_epoch, EpochUnit, Extraction, MAX_EPOCH_SECONDS, MIN_EPOCH_SECONDS,
};
