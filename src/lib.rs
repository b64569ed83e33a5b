pub mod clock;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod forms;
pub mod logging;
pub mod metrics;
pub mod query;
pub mod storage;
pub mod web;
