pub mod decor;
pub mod hit;

pub use decor::{Corner, Decorations, Handle};
pub use hit::{Containment, hit_test_point, hit_test_rect};
