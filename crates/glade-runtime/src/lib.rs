//! Glade Runtime - Frame loop infrastructure
//!
//! Provides the building blocks the frame driver ticks once per refresh:
//! - `FrameClock` - measures the previous frame's duration as a variable `dt`
//! - `InputState` - keyboard, mouse and touch tracking with action bindings

mod clock;
mod input;

pub use clock::{FrameClock, TimeSource};
pub use input::{Action, InputState, Key, MouseButton};
