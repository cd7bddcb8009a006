//! Rubber-band (marquee) selection.
//!
//! Dragging right-to-left "touches": anything the band overlaps is picked.
//! Dragging left-to-right only picks elements fully inside the band.

use fpd_core::id::ElementId;
use fpd_core::model::{BBox, Scene};
use fpd_render::decor::band_path;
use fpd_render::hit::{Containment, hit_test_rect};
use kurbo::Point;

/// A band from `origin` to `current`, both in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RubberBand {
    pub origin: Point,
    pub current: Point,
}

impl RubberBand {
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            current: origin,
        }
    }

    pub fn update(&mut self, current: Point) {
        self.current = current;
    }

    /// Outline path, starting at the origin corner.
    pub fn path(&self) -> String {
        band_path(self.origin, self.current)
    }

    /// `true` when dragged right to left.
    pub fn touched(&self) -> bool {
        self.origin.x > self.current.x
    }

    pub fn containment(&self) -> Containment {
        if self.touched() {
            Containment::Touch
        } else {
            Containment::Enclose
        }
    }

    /// Normalized band rectangle.
    pub fn rect(&self) -> BBox {
        BBox::new(
            self.origin.x.min(self.current.x),
            self.origin.y.min(self.current.y),
            (self.current.x - self.origin.x).abs(),
            (self.current.y - self.origin.y).abs(),
        )
    }

    /// Ids the band picks up on release.
    pub fn collect(&self, scene: &Scene) -> Vec<ElementId> {
        hit_test_rect(scene, &self.rect(), self.containment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpd_core::model::Element;
    use kurbo::Affine;
    use pretty_assertions::assert_eq;

    fn scene() -> Scene {
        let mut scene = Scene::new(300.0, 200.0);
        scene.push(Element::new(ElementId(1), BBox::new(0.0, 0.0, 300.0, 200.0)).panel());
        for (id, x) in [(5, 20.0), (9, 100.0)] {
            scene.push(
                Element::new(ElementId(id), BBox::new(0.0, 0.0, 40.0, 40.0))
                    .with_transform(Affine::translate((x, 20.0)))
                    .with_stroke_width(4.0),
            );
        }
        scene
    }

    #[test]
    fn left_to_right_requires_enclosure() {
        let mut band = RubberBand::new(Point::new(10.0, 10.0));
        band.update(Point::new(120.0, 70.0));
        assert!(!band.touched());
        assert_eq!(band.collect(&scene()), vec![ElementId(5)]);
    }

    #[test]
    fn right_to_left_picks_anything_touched() {
        let mut band = RubberBand::new(Point::new(120.0, 70.0));
        band.update(Point::new(10.0, 10.0));
        assert!(band.touched());
        assert_eq!(band.collect(&scene()), vec![ElementId(5), ElementId(9)]);
    }

    #[test]
    fn stroke_is_not_added_to_band_boxes() {
        // Box 20..60 encloses strictly even though the stroked box would not.
        let mut band = RubberBand::new(Point::new(19.0, 19.0));
        band.update(Point::new(61.0, 61.0));
        assert_eq!(band.collect(&scene()), vec![ElementId(5)]);
    }

    #[test]
    fn exact_fit_is_not_enclosed() {
        let mut band = RubberBand::new(Point::new(20.0, 20.0));
        band.update(Point::new(60.0, 60.0));
        assert_eq!(band.collect(&scene()), vec![]);
    }

    #[test]
    fn rect_and_path_follow_the_drag() {
        let mut band = RubberBand::new(Point::new(50.0, 40.0));
        band.update(Point::new(10.0, 60.0));
        assert_eq!(band.rect(), BBox::new(10.0, 40.0, 40.0, 20.0));
        assert_eq!(band.path(), "M 50,40L 10,40L 10,60L 50,60z");
    }
}
