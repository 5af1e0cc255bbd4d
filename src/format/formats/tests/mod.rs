//! Unit tests for hotspot format implementations.
//!
//! These tests verify parsing edge cases, the exact CSV output contract and
//! encode/decode round trips.
