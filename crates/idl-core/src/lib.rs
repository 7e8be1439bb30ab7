//! Core of the IDL image list downloader.
//!
//! Reads a list of image URLs and downloads each one into a directory,
//! validating URLs and keeping a running disk-space budget. See
//! [`pipeline::Pipeline`] for the driver.

pub mod config;
pub mod logging;

pub mod budget;
pub mod fetch;
pub mod fetch_head;
pub mod input;
pub mod pipeline;
pub mod size;
pub mod storage;
pub mod url_model;
pub mod validate;
