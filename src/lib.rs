//! Piecework payroll engine for survey work.
//!
//! This crate derives monthly salaries from per-category survey piecework,
//! admin-recorded rejections and approved leave, and serves the surrounding
//! attendance, survey and leave operations over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod storage;
