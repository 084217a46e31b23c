//! Basic types shared by the drawing model

mod handle;

pub use handle::Handle;
