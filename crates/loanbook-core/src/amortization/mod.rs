pub mod schedule;

#[cfg(feature = "mortgage")]
pub mod mortgage;
