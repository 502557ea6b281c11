pub mod allocation;
pub mod reports;
pub mod schedule;
pub mod statement;
