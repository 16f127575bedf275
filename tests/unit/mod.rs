//! Integration test entry point, grounded on the teacher crate's own
//! `tests/unit/mod.rs` target (declared via `[[test]] path =
//! "tests/unit/mod.rs"` in `Cargo.toml`) gathering one file per concern.

mod book_scenarios;
mod property_tests;
mod validation_tests;
