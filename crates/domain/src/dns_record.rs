mod record_type;

pub use record_type::{QClass, QType, RCode};
