pub mod entry;
pub mod group;
pub mod judging;
pub mod progress;
pub mod settings;
