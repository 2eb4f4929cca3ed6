//! egui user interface

mod panel;

pub use panel::*;
