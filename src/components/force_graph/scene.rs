//! Drawing surface abstraction. The canvas implements it in the browser;
//! tests record the calls instead.

use super::state::ViewTransform;
use super::style::{LinkStyle, NodeStyle};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

pub trait Scene {
	/// Wipe the whole surface.
	fn clear(&mut self, width: f64, height: f64);
	/// Graph coordinates are mapped through `transform` until
	/// [`Scene::pop_transform`].
	fn push_transform(&mut self, transform: &ViewTransform);
	fn pop_transform(&mut self);
	fn draw_link(&mut self, from: Point, to: Point, style: &LinkStyle);
	/// Circle at `at` with `label` centered below it.
	fn draw_node(&mut self, at: Point, label: &str, style: &NodeStyle);
	/// A centered message in screen coordinates.
	fn draw_message(&mut self, width: f64, height: f64, text: &str);
}
