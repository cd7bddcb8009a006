pub mod config;
pub mod coords;
pub mod geometry;
pub mod id;
pub mod load;
pub mod model;
pub mod view;

pub use config::EngineConfig;
pub use coords::{scene_to_screen, screen_delta_to_scene, screen_to_scene};
pub use geometry::{GeometryError, group_bbox, precise_bbox, selection_bbox, union_bbox};
pub use id::ElementId;
pub use load::{LoadError, SceneDocument, load_scene, load_scene_json, parse_document};
pub use model::*;
pub use view::ViewTransform;

// Re-export kurbo geometry so downstream crates share one version
pub use kurbo::{Affine, Point, Vec2};
