pub mod app;
pub mod blacklist;
pub mod config;
pub mod domain;
pub mod error;
pub mod fs_util;
pub mod genome;
pub mod manifest;
pub mod output;
pub mod plugins;
pub mod tools;
