//! Sitelytics: self-hosted web analytics with JSON file storage.
//!
//! Events arrive on `POST /api/analytics`, are merged into per-visitor
//! sessions, and are persisted to two JSON files under the data directory.
//! The dashboard reads aggregated statistics from `GET /api/analytics/stats`.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod ingest;
pub mod query;
pub mod server;
pub mod storage;
