//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`: never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod atomic_write;
pub mod chain;
pub mod config_service;
pub mod provision;
pub mod remote;

#[cfg(test)]
pub(crate) mod test_support;
