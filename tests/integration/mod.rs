//! Integration Tests Module
//!
//! End-to-end tests over real SQLite files in temporary directories:
//! cross-identity sharing through one pool file, the local-only lifecycle,
//! and containment of backend faults.

// Two devices sharing one pool
mod sharing_test;

// Local-only mode across restarts
mod local_fallback_test;

// Faulty document stores
mod failure_containment_test;
