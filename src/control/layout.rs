//! Right-anchored panel placement

use glam::Vec2;

/// Default panel size in pixels
pub const PANEL_SIZE: Vec2 = Vec2::new(320.0, 480.0);
/// Distance between the panel and the right window edge
pub const PANEL_RIGHT_MARGIN: f32 = 25.0;
/// Distance between the panel and the top window edge
pub const PANEL_TOP_MARGIN: f32 = 5.0;

/// Position of the slider panel, kept anchored to the right window edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLayout {
    /// Top-left corner in window pixels
    pub position: Vec2,
    pub size: Vec2,
    window_size: (u32, u32),
}

impl PanelLayout {
    /// Place a panel of `size` against the right edge of a window of `window_size`
    pub fn anchored_right(window_size: (u32, u32), size: Vec2) -> Self {
        let x = window_size.0 as f32 - size.x - PANEL_RIGHT_MARGIN;
        Self {
            position: Vec2::new(x, PANEL_TOP_MARGIN),
            size,
            window_size,
        }
    }

    /// Window size the layout was last aligned to
    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    /// Track a window resize. The panel moves by the width delta only; a
    /// repeated size is a no-op.
    pub fn on_window_resize(&mut self, new_size: (u32, u32)) {
        if new_size == self.window_size {
            return;
        }
        let delta_x = new_size.0 as i64 - self.window_size.0 as i64;
        self.window_size = new_size;
        self.realign(Vec2::new(delta_x as f32, 0.0));
    }

    fn realign(&mut self, offset: Vec2) {
        self.position += offset;
        log::debug!("panel realigned to ({:.0}, {:.0})", self.position.x, self.position.y);
    }
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::anchored_right((1280, 720), PANEL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn anchored_to_the_right_edge() {
        let layout = PanelLayout::anchored_right((1000, 600), PANEL_SIZE);
        assert_eq!(layout.position, Vec2::new(1000.0 - 320.0 - 25.0, 5.0));
    }

    #[test]
    fn same_size_twice_is_a_noop() {
        let mut layout = PanelLayout::anchored_right((800, 600), PANEL_SIZE);
        layout.on_window_resize((900, 600));
        let after_first = layout;
        layout.on_window_resize((900, 600));
        assert_eq!(layout, after_first);
    }

    #[rstest]
    #[case((800, 600), (950, 600), 150.0)]
    #[case((800, 600), (640, 700), -160.0)]
    #[case((800, 600), (801, 100), 1.0)]
    fn shifts_by_the_width_delta(#[case] from: (u32, u32), #[case] to: (u32, u32), #[case] delta: f32) {
        let mut layout = PanelLayout::anchored_right(from, PANEL_SIZE);
        let before = layout.position;
        layout.on_window_resize(to);
        assert_eq!(layout.position.x - before.x, delta);
        assert_eq!(layout.position.y, before.y);
        assert_eq!(layout.window_size(), to);
    }
}
