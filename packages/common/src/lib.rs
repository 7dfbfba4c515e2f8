pub mod partition;
pub mod permission;
pub mod progress;
pub mod score;
pub mod skill_level;

pub use permission::{Actor, Permission, PermissionSet, has_permission};
pub use progress::Progress;
pub use score::Scores;
pub use skill_level::SkillLevel;
