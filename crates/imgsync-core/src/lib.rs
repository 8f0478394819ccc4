//! imgsync core: download the images an HTML page references and point the
//! page at the local copies.

pub mod config;
pub mod logging;

pub mod downloader;
pub mod driver;
pub mod extract;
pub mod fetch;
pub mod retry;
pub mod rewrite;
pub mod storage;
pub mod url_model;
