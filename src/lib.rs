pub mod api;
pub mod catalog;
pub mod command;
pub mod config;
pub mod db;
pub mod dice;
pub mod game;
pub mod metrics;
pub mod progression;
pub mod render;
pub mod reply;
pub mod rules;
pub mod session;
