//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering and layout
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `pages`: Page-specific content rendering (login, calculator, history, ...)

pub mod input;
pub mod pages;
pub mod render;
pub mod styles;
