pub mod clock;
pub mod config;
pub mod error;
pub mod generator;
pub mod report;
pub mod scheduler;
pub mod shutdown;
pub mod simulation;
pub mod sink;
pub mod worker;
