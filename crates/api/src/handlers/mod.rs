pub mod attendance;
pub mod predict;
pub mod subjects;
