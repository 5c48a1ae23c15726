pub mod config;
pub mod controller;
pub mod report;
pub mod worker;
