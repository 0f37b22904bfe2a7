mod extract;
mod feature_id;
mod table;

pub use feature_id::FeatureId;
pub use table::{FeatureRecord, FeatureTable};
