pub mod contest;
pub mod entry;
pub mod evaluation;
pub mod evaluator;
pub mod evaluator_permission;
pub mod judging_group;
pub mod judging_setting;
