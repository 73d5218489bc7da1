use serde::{Deserialize, Serialize};

/// Screen-space rectangle in pixels.
///
/// Coordinates may be negative: on multi-monitor setups the virtual screen
/// origin is the primary monitor's top-left corner, and monitors to the
/// left of or above it have negative coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Clamp `rect` so it lies fully inside `screen`.
///
/// Applied whenever persisted host bounds are restored; a monitor
/// configuration change between runs can leave a saved rectangle entirely
/// off-screen, and a tab host must never open where the user cannot reach
/// it. Size is reduced first if the rectangle is larger than the screen,
/// then the origin is shifted inward.
pub fn clamp_to_virtual_screen(rect: Rect, screen: Rect) -> Rect {
    let width = rect.width.min(screen.width).max(0);
    let height = rect.height.min(screen.height).max(0);

    let x = rect.x.clamp(screen.x, screen.right() - width);
    let y = rect.y.clamp(screen.y, screen.bottom() - height);

    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect {
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
    };

    #[test]
    fn test_rect_inside_screen_is_unchanged() {
        let rect = Rect::new(100, 100, 800, 600);
        assert_eq!(clamp_to_virtual_screen(rect, SCREEN), rect);
    }

    #[test]
    fn test_rect_entirely_off_screen_is_pulled_inside() {
        // Saved on a monitor that no longer exists, far to the right.
        let rect = Rect::new(5000, 4000, 800, 600);
        let clamped = clamp_to_virtual_screen(rect, SCREEN);
        assert!(SCREEN.contains(&clamped));
        assert_eq!(clamped.width, 800);
        assert_eq!(clamped.height, 600);
    }

    #[test]
    fn test_rect_off_negative_edge_is_pulled_inside() {
        let screen = Rect::new(-1920, 0, 3840, 1080);
        let rect = Rect::new(-9000, -500, 800, 600);
        let clamped = clamp_to_virtual_screen(rect, screen);
        assert!(screen.contains(&clamped));
    }

    #[test]
    fn test_oversized_rect_is_shrunk_to_screen() {
        let rect = Rect::new(-100, -100, 4000, 3000);
        let clamped = clamp_to_virtual_screen(rect, SCREEN);
        assert_eq!(clamped, SCREEN);
    }

    #[test]
    fn test_partial_overlap_is_shifted_fully_inside() {
        let rect = Rect::new(1800, 1000, 800, 600);
        let clamped = clamp_to_virtual_screen(rect, SCREEN);
        assert!(SCREEN.contains(&clamped));
        assert_eq!((clamped.width, clamped.height), (800, 600));
        assert_eq!((clamped.x, clamped.y), (1120, 480));
    }
}
