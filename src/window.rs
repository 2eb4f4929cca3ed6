//! Viewer window
//!
//! The renderer works in physical pixels while egui lays out in logical
//! points. [`Window`] tracks both so the slider panel stays anchored on
//! high-DPI displays.

use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::EventLoop;
use winit::window::{Window as WinitWindow, WindowBuilder};

use crate::error::{ViewerError, ViewerResult};

/// A change the render loop has to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowChange {
    /// New surface size in pixels and panel space size in points
    Resized {
        physical: (u32, u32),
        logical: (u32, u32),
    },
    CloseRequested,
}

pub struct Window {
    handle: Arc<WinitWindow>,
    scale_factor: f64,
}

impl Window {
    /// Open a window of `width` x `height` physical pixels
    pub fn new(event_loop: &EventLoop<()>, title: &str, width: u32, height: u32) -> ViewerResult<Self> {
        let handle = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height))
            .build(event_loop)
            .map_err(|e| ViewerError::WindowCreation(e.to_string()))?;
        let scale_factor = handle.scale_factor();

        Ok(Self {
            handle: Arc::new(handle),
            scale_factor,
        })
    }

    pub fn handle(&self) -> &WinitWindow {
        &self.handle
    }

    /// Shared handle, for surface creation
    pub fn handle_arc(&self) -> Arc<WinitWindow> {
        Arc::clone(&self.handle)
    }

    pub fn physical_size(&self) -> (u32, u32) {
        let size = self.handle.inner_size();
        (size.width, size.height)
    }

    /// Size in egui points
    pub fn logical_size(&self) -> (u32, u32) {
        to_logical(self.physical_size(), self.scale_factor)
    }

    /// Track size and scale changes. Returns what the loop must act on.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<WindowChange> {
        match event {
            WindowEvent::Resized(size) => Some(self.resized((size.width, size.height))),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = *scale_factor;
                Some(self.resized(self.physical_size()))
            }
            WindowEvent::CloseRequested => Some(WindowChange::CloseRequested),
            _ => None,
        }
    }

    fn resized(&self, physical: (u32, u32)) -> WindowChange {
        WindowChange::Resized {
            physical,
            logical: to_logical(physical, self.scale_factor),
        }
    }

    pub fn request_redraw(&self) {
        self.handle.request_redraw();
    }
}

fn to_logical(physical: (u32, u32), scale_factor: f64) -> (u32, u32) {
    let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
    (
        (physical.0 as f64 / scale).round() as u32,
        (physical.1 as f64 / scale).round() as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case((1280, 720), 1.0, (1280, 720))]
    #[case((2560, 1440), 2.0, (1280, 720))]
    #[case((1000, 601), 1.5, (667, 401))]
    #[case((800, 600), 0.0, (800, 600))]
    fn logical_size_divides_by_the_scale(
        #[case] physical: (u32, u32),
        #[case] scale: f64,
        #[case] expected: (u32, u32),
    ) {
        assert_eq!(to_logical(physical, scale), expected);
    }
}
