//! Media helpers for working with photo URLs.

mod resize;

pub use resize::{Fit, Format, ResizeSpec};
