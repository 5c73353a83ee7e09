//! Client-side state reconstruction
//!
//! Headless model of what a browser client does with the server stream:
//! buffer timestamped updates, render a view delayed behind "now", and send
//! input only when it changes.

pub mod buffer;
pub mod input;
pub mod view;

pub use buffer::{PlayerView, Snapshot, SnapshotBuffer, SNAPSHOT_CAPACITY};
pub use input::{Direction, InputTracker};
pub use view::{ClientView, ConnectionPhase, RenderFrame, RenderedPlayer};
