//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and editor operations into use-case APIs.
//! - Keep front ends decoupled from storage details.

pub mod mind_service;
