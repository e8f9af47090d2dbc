//! Scene-editing engine for the certificate designer.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! interactive part of the designer: translating raw DOM pointer and keyboard
//! events into document mutations, hit-testing elements and their handles,
//! computing drag/resize/rotate geometry, keeping undo/redo history, and
//! rendering the scene. The host layer only wires DOM events to the engine,
//! shows the inline text editor when asked to, and persists the document.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Browser-bound [`engine::Engine`] and testable [`engine::EngineCore`] |
//! | [`doc`] | Certificate document, element types, sparse patches |
//! | [`viewport`] | Screen-to-scene coordinate mapping |
//! | [`text`] | Text measurement seam used by hit-testing and rendering |
//! | [`hit`] | Element hit-testing and handle classification |
//! | [`transform`] | Pure drag/resize/rotate geometry |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`zorder`] | Layer reordering, duplication and deletion |
//! | [`history`] | Snapshot undo/redo stack |
//! | [`render`] | Pure scene to draw-command conversion |
//! | [`paint`] | Draw-command execution on a 2D context and PNG export |
//! | [`background`] | Asynchronous background image loading |
//! | [`host`] | Contracts for the external persistence layer |
//! | [`config`] | Editor tolerances and colors |
//! | [`consts`] | Shared numeric constants and defaults |
//! | [`error`] | Editor error type |

pub mod background;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod hit;
pub mod history;
pub mod host;
pub mod input;
pub mod paint;
pub mod render;
pub mod text;
pub mod transform;
pub mod viewport;
pub mod zorder;
