pub mod callbacks;
pub mod config;
pub mod model;
pub mod output;
pub mod schedule;
pub mod simulation;
