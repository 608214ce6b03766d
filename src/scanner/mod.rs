pub mod classifier;
pub mod events;
pub mod traverser;

pub use classifier::Classifier;
pub use events::{ScanEvent, ScanObserver};
pub use traverser::{Traverser, WalkStatistics};
