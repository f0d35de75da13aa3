//! Domain tests module.
//!
//! - Property tests: proptest-based randomized checks of reducer invariants
//! - Scenario tests: end-to-end runs through the controller actor
