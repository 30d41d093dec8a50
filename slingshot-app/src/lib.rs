//! Slingshot terminal shell
//!
//! A single-page application shell: header, responsive navigation drawer,
//! one active page and a connectivity snackbar, all driven by one store.
//!
//! Library target so integration tests can reach the shell, its state and
//! its components.

pub mod action;
pub mod commands;
pub mod config;
pub mod host;
pub mod pages;
pub mod reducer;
pub mod shell;
pub mod state;
