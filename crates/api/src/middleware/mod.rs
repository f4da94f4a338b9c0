//! Request middleware: authentication extractors and request tracking.

pub mod auth;
pub mod track;
pub mod viewer;
