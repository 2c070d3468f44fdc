#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod color;
pub mod command;
pub mod document;
pub mod error;
pub mod event;
pub mod file_handler;
pub mod geometry;
pub mod id_generator;
pub mod input;
pub mod raster;
pub mod renderer;
pub mod state;
pub mod tools;

pub use app::PixelApp;
pub use color::Color;
pub use command::{Command, CommandHistory};
pub use document::{Drawing, Panel, Project};
pub use error::ModelError;
pub use geometry::{GridRect, Position};
pub use input::{GestureArbiter, GestureHandler, InputEvent};
pub use renderer::Renderer;
pub use state::EditorContext;
