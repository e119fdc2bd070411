pub mod app;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
