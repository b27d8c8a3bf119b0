//! Obscura Media Model
//!
//! Defines the core data contracts for Obscura streams:
//! - **Rect:** Axis-aligned pixel rectangles with clamping and proximity tests
//! - **Frame:** Owned RGB24 and grayscale frame buffers with region operations
//! - **Detection:** Face detection records exchanged with external detectors
//! - **Audio:** PCM stream format descriptors
//!
//! All rectangle coordinates are in physical pixels of the frame they were
//! measured against; they do not survive a frame-dimension change.

pub mod audio;
pub mod detection;
pub mod frame;
pub mod rect;

pub use audio::*;
pub use detection::*;
pub use frame::*;
pub use rect::*;
