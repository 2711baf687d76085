#![allow(clippy::needless_return, clippy::collapsible_if, clippy::collapsible_else_if,
         clippy::comparison_chain, clippy::new_without_default)]

pub mod error;
pub mod host;
pub mod qmenu;
pub mod server;
pub mod favlist;
pub mod game_list;
pub mod browser;
pub mod menu;
