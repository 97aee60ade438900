use x11rb::protocol::xproto::{Arc, Point, Rectangle};

use crate::config::Shape;

/// Full circle in X11's 1/64 degree units.
pub const FULL_ARC: i16 = 360 * 64;

#[derive(Clone, Debug, PartialEq)]
pub enum Silhouette {
    Ellipse(Arc),
    Polygon(Vec<Point>),
}

/// A 1-bit bounding mask: cleared to 0 over `clear`, then `silhouette` painted with 1.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeMask {
    pub width: u16,
    pub height: u16,
    pub clear: Rectangle,
    pub silhouette: Silhouette,
}

impl ShapeMask {
    pub fn new(shape: Shape, width: u16, height: u16) -> Option<Self> {
        let silhouette = match shape {
            Shape::Rectangle => return None,
            Shape::Circle => Silhouette::Ellipse(Arc {
                x: 0,
                y: 0,
                width,
                height,
                angle1: 0,
                angle2: FULL_ARC,
            }),
            Shape::Triangle => Silhouette::Polygon(vec![
                Point {
                    x: 0,
                    y: height as i16,
                },
                Point {
                    x: (width / 2) as i16,
                    y: 0,
                },
                Point {
                    x: width as i16,
                    y: height as i16,
                },
            ]),
        };
        Some(Self {
            width,
            height,
            clear: Rectangle {
                x: 0,
                y: 0,
                width,
                height,
            },
            silhouette,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_needs_no_mask() {
        assert_eq!(ShapeMask::new(Shape::Rectangle, 640, 480), None);
    }

    #[test]
    fn circle_is_inscribed() {
        let mask = ShapeMask::new(Shape::Circle, 640, 480).unwrap();
        assert_eq!(mask.clear.width, 640);
        assert_eq!(mask.clear.height, 480);
        match mask.silhouette {
            Silhouette::Ellipse(arc) => {
                assert_eq!((arc.x, arc.y, arc.width, arc.height), (0, 0, 640, 480));
                assert_eq!((arc.angle1, arc.angle2), (0, 23040));
            }
            other => panic!("expected ellipse, got {:?}", other),
        }
    }

    #[test]
    fn triangle_apex_at_top_centre() {
        let mask = ShapeMask::new(Shape::Triangle, 101, 50).unwrap();
        let points: Vec<_> = match mask.silhouette {
            Silhouette::Polygon(points) => points.iter().map(|p| (p.x, p.y)).collect(),
            other => panic!("expected polygon, got {:?}", other),
        };
        assert_eq!(points, vec![(0, 50), (50, 0), (101, 50)]);
    }
}
