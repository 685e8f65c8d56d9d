//! End-to-end tests for the drive HTTP API on the in-memory backend.

mod file_test;
mod folder_test;
mod helpers;
mod quota_test;
