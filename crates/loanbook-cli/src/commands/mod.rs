pub mod dashboard;
pub mod mortgage;
pub mod schedule;
