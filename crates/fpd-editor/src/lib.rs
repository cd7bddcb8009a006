pub mod engine;
pub mod input;
pub mod marquee;
pub mod overlap;
pub mod selection;
pub mod transform;

pub use engine::{
    DragKind, GestureError, InteractionEngine, InteractionState, Notification, Readiness,
    ReloadMode, TransformUpdate,
};
pub use input::{InputEvent, Modifiers, PointerButton};
pub use selection::Selection;
