//! Client-side orchestration of the FinApp accounting start gate and the
//! guided first-run wizard.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod onboarding;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
