//! `imgsync config-path` – print the config file location.

use anyhow::Result;
use imgsync_core::config;
use std::path::Path;

pub fn run_config_path(override_path: Option<&Path>) -> Result<()> {
    match override_path {
        Some(p) => println!("{}", p.display()),
        None => println!("{}", config::config_path()?.display()),
    }
    Ok(())
}
