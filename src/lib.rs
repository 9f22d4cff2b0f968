pub mod categories;
pub mod config;
pub mod history;
pub mod http;
pub mod humanize;
pub mod local;
pub mod merge;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod sources;
pub mod storage;
