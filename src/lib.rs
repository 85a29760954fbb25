//! CookMate
//!
//! 从食材照片生成菜谱。Composition root and command-line front end for the
//! `cm-*` crates.

pub mod bootstrap;
pub mod cli;
