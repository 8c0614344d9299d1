/*
 * This module provides the application logic layer, centered around
 * `ContextYapLogic`, which receives discrete `UserAction`s from the
 * presentation layer and applies them to the item store and the platform
 * collaborators. Unit tests for `ContextYapLogic` are in `handler_tests.rs`.
 */
pub mod handler;


pub use handler::{ActionOutcome, ContextYapLogic, UserAction};
