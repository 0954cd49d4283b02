//! HTTP service exposing the TypeSpark study session engine.

pub mod adapters;
pub mod config;
pub mod content;
pub mod error;
pub mod web;
