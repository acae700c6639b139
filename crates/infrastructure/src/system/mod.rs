pub mod features;
pub mod file_source;

pub use features::compiled_features;
pub use file_source::LocalFileSource;
