use serde::{Deserialize, Serialize};

/// A window's position and size in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point, where consumers anchor the window's visual element.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_clone_and_equality() {
        let r = Rect::new(10.0, 20.0, 800.0, 600.0);
        let r2 = r;
        assert_eq!(r, r2);
    }

    #[test]
    fn rect_serialization() {
        let r = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        let json = serde_json::to_string(&r).unwrap();
        let deserialized: Rect = serde_json::from_str(&json).unwrap();
        assert_eq!(r, deserialized);
    }

    #[test]
    fn rect_center() {
        let r = Rect::new(100.0, 200.0, 800.0, 600.0);
        assert_eq!(r.center(), (500.0, 500.0));
    }

    #[test]
    fn rect_default_is_zero() {
        let r = Rect::default();
        assert_eq!(r, Rect::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn rect_inequality_on_move() {
        let a = Rect::new(0.0, 0.0, 640.0, 480.0);
        let mut b = a;
        b.x = 1.0;
        assert_ne!(a, b);
    }
}
