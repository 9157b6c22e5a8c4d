//! Geographic rings to 2D viewport paths.
//!
//! Two strategies are supported:
//! - [`Projection::Fitted`]: one bounding box over every point of every ring,
//!   scaled uniformly into the padded viewport and centered. Used for the
//!   regional map.
//! - [`Projection::Equirectangular`]: the fixed world range
//!   `[-180, 180] x [-90, 90]` mapped linearly onto the padded viewport. Used
//!   for whole-world overviews.
//!
//! Viewport `y` grows downwards, so latitude is flipped in both strategies.

use foundation::Aabb2;
use formats::Ring;
use serde::{Deserialize, Serialize, Serializer};

pub const MAP_WIDTH: f64 = 760.0;
pub const MAP_HEIGHT: f64 = 420.0;
pub const MAP_PADDING: f64 = 22.0;

/// Substitute for a zero longitude/latitude span.
const MIN_SPAN_DEG: f64 = 1e-9;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, padding: f64) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    pub fn usable_width(&self) -> f64 {
        (self.width - self.padding * 2.0).max(0.0)
    }

    pub fn usable_height(&self) -> f64 {
        (self.height - self.padding * 2.0).max(0.0)
    }

    pub fn center(&self) -> [f64; 2] {
        [self.width / 2.0, self.height / 2.0]
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(MAP_WIDTH, MAP_HEIGHT, MAP_PADDING)
    }
}

/// Viewport coordinates derived 1:1 from one ring.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProjectedPath {
    pub points: Vec<[f64; 2]>,
}

impl ProjectedPath {
    /// SVG `points` attribute form: `"x,y x,y ..."` with two decimals.
    pub fn to_svg_points(&self) -> String {
        self.points
            .iter()
            .map(|[x, y]| format!("{x:.2},{y:.2}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Serialize for ProjectedPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_svg_points())
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    #[default]
    Fitted,
    Equirectangular,
}

impl Projection {
    pub fn project(self, rings: &[Ring], viewport: Viewport) -> Vec<ProjectedPath> {
        match self {
            Projection::Fitted => project_fitted(rings, viewport),
            Projection::Equirectangular => project_equirectangular(rings, viewport),
        }
    }
}

/// Fit all rings into the viewport with one shared, aspect-preserving scale.
pub fn project_fitted(rings: &[Ring], viewport: Viewport) -> Vec<ProjectedPath> {
    let Some(bounds) = Aabb2::from_points(rings.iter().flatten().copied()) else {
        return rings.iter().map(|_| ProjectedPath::default()).collect();
    };

    let span_lon = bounds.width().max(MIN_SPAN_DEG);
    let span_lat = bounds.height().max(MIN_SPAN_DEG);
    let scale_x = viewport.usable_width() / span_lon;
    let scale_y = viewport.usable_height() / span_lat;
    let scale = scale_x.min(scale_y);

    let offset_x = (viewport.width - span_lon * scale) / 2.0;
    let offset_y = (viewport.height - span_lat * scale) / 2.0;
    let [min_lon, min_lat] = bounds.min;

    rings
        .iter()
        .map(|ring| ProjectedPath {
            points: ring
                .iter()
                .map(|&[lon, lat]| {
                    let x = (lon - min_lon) * scale + offset_x;
                    let y = viewport.height - ((lat - min_lat) * scale + offset_y);
                    [x, y]
                })
                .collect(),
        })
        .collect()
}

/// Map absolute longitude/latitude onto the padded viewport.
pub fn project_equirectangular(rings: &[Ring], viewport: Viewport) -> Vec<ProjectedPath> {
    let usable_width = viewport.usable_width();
    let usable_height = viewport.usable_height();

    rings
        .iter()
        .map(|ring| ProjectedPath {
            points: ring
                .iter()
                .map(|&[lon, lat]| {
                    let x = ((lon + 180.0) / 360.0) * usable_width + viewport.padding;
                    let y = ((90.0 - lat) / 180.0) * usable_height + viewport.padding;
                    [x, y]
                })
                .collect(),
        })
        .collect()
}

/// Center of the bounding box of all projected points.
///
/// Falls back to the viewport center when there is nothing to bound.
pub fn paths_center(paths: &[ProjectedPath], viewport: Viewport) -> [f64; 2] {
    Aabb2::from_points(paths.iter().flat_map(|p| p.points.iter().copied()))
        .map(|b| b.center())
        .unwrap_or_else(|| viewport.center())
}
