//! Feature modules: state, key handling, and rendering per screen concern.

pub mod login;
pub mod menu;
pub mod notice;
pub mod permission;
