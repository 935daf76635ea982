pub mod annotations;
pub mod splits;

pub use annotations::AnnotationIndex;
pub use splits::SplitIndex;
