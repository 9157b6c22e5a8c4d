/// Axis-aligned 2D bounding box (`[x, y]`, typically `[lon, lat]`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Bounding box over every point yielded; `None` when there are none.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; 2]>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Aabb2::new(first, first);
        for p in iter {
            bounds.expand(p);
        }
        Some(bounds)
    }

    pub fn expand(&mut self, p: [f64; 2]) {
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2;

    #[test]
    fn from_points_covers_all_points() {
        let b = Aabb2::from_points([[1.0, 5.0], [-2.0, 3.0], [4.0, -1.0]]).unwrap();
        assert_eq!(b.min, [-2.0, -1.0]);
        assert_eq!(b.max, [4.0, 5.0]);
        assert_eq!(b.width(), 6.0);
        assert_eq!(b.height(), 6.0);
        assert_eq!(b.center(), [1.0, 2.0]);
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(Aabb2::from_points(std::iter::empty()).is_none());
    }
}
