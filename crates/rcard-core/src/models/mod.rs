//! Data models shared by the parser, the OCR layer, and the CLI.

pub mod config;
pub mod record;
pub mod sheet;
