//! Humtap library - synthetic machinery hum, recorded and shipped in fragments

pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod encode;
pub mod params;
pub mod recorder;
pub mod upload;
