mod claim;
mod groups;
mod partition;
mod progress;
