#![allow(clippy::needless_return, clippy::collapsible_if, clippy::collapsible_else_if,
         clippy::comparison_chain, clippy::manual_strip)]

pub mod q_shared;
pub mod common;
pub mod net;
