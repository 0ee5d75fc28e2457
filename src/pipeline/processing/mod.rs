pub mod dedup;
pub mod duration;
pub mod normalize;
pub mod overdue;
pub mod ranking;
