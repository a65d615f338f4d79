pub mod alarm;
pub mod app;
pub mod config;
pub mod countdown;
pub mod duration_format;
pub mod stopwatch;
pub mod ticker;
pub mod time_format;
pub mod time_provider;
