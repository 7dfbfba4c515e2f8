pub mod entry;
pub mod group;
pub mod judging;
pub mod partition;
pub mod progress;
pub mod settings;
