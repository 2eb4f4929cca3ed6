//! egui GUI integration
//!
//! Provides egui input handling and rendering on the wgpu renderer.

mod wgpu;

pub use self::wgpu::EguiIntegration;
