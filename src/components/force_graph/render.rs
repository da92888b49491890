use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scene::{Point, Scene};
use super::state::{ForceGraphState, ViewTransform};
use super::style::{LinkStyle, NodeStyle};

const BACKGROUND: &str = "#fafafa";

/// Draw the current view: links underneath, then nodes, with emphasized
/// nodes last so they sit on top.
pub fn render(state: &ForceGraphState, scene: &mut impl Scene) {
	scene.clear(state.width, state.height);
	scene.push_transform(&state.transform);

	for &l in &state.view.links {
		let link = state.graph.link(l);
		let (Some(from), Some(to)) = (state.node_point(link.source), state.node_point(link.target))
		else {
			continue;
		};
		let style = LinkStyle::new(&link.kind, link.value, state.selection.link_emphasis(l));
		scene.draw_link(from, to, &style);
	}

	let mut nodes: Vec<_> = state
		.view
		.nodes
		.iter()
		.map(|&idx| (state.selection.node_emphasis(idx).layer(), idx))
		.collect();
	nodes.sort_by_key(|&(layer, _)| layer);

	for (_, idx) in nodes {
		let Some(at) = state.node_point(idx) else {
			continue;
		};
		scene.draw_node(at, &state.graph.node(idx).id, &state.node_style(idx));
	}

	scene.pop_transform();
}

/// [`Scene`] over a 2D canvas context.
pub struct CanvasScene<'a> {
	ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasScene<'a> {
	pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
		Self { ctx }
	}
}

impl Scene for CanvasScene<'_> {
	fn clear(&mut self, width: f64, height: f64) {
		self.ctx.set_fill_style_str(BACKGROUND);
		self.ctx.fill_rect(0.0, 0.0, width, height);
	}

	fn push_transform(&mut self, transform: &ViewTransform) {
		self.ctx.save();
		let _ = self.ctx.translate(transform.x, transform.y);
		let _ = self.ctx.scale(transform.k, transform.k);
	}

	fn pop_transform(&mut self) {
		self.ctx.restore();
	}

	fn draw_link(&mut self, from: Point, to: Point, style: &LinkStyle) {
		self.ctx.set_stroke_style_str(&style.color.to_css());
		self.ctx.set_line_width(style.width);
		self.ctx.begin_path();
		self.ctx.move_to(from.x, from.y);
		self.ctx.line_to(to.x, to.y);
		self.ctx.stroke();
	}

	fn draw_node(&mut self, at: Point, label: &str, style: &NodeStyle) {
		let ctx = self.ctx;
		ctx.begin_path();
		let _ = ctx.arc(at.x, at.y, style.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&style.fill.to_css());
		ctx.fill();
		ctx.set_stroke_style_str(&style.stroke.to_css());
		ctx.set_line_width(style.stroke_width);
		ctx.stroke();

		ctx.set_fill_style_str(&style.label_color.to_css());
		ctx.set_font(&format!("{}px sans-serif", style.font_size));
		ctx.set_text_align("center");
		let _ = ctx.fill_text(label, at.x, at.y + style.label_offset);
	}

	fn draw_message(&mut self, width: f64, height: f64, text: &str) {
		self.ctx.set_fill_style_str("#d62728");
		self.ctx.set_font("16px sans-serif");
		self.ctx.set_text_align("center");
		let _ = self.ctx.fill_text(text, width / 2.0, height / 2.0);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::graph::Graph;
	use crate::components::force_graph::graph::tests::{link, node};
	use crate::components::force_graph::style::{DIMMED_LINK_OPACITY, DIMMED_NODE_OPACITY, LINK_OPACITY};
	use crate::components::force_graph::types::RelationType;

	#[derive(Debug, PartialEq)]
	enum Call {
		Clear,
		Push,
		Pop,
		Link(LinkStyle),
		Node(String, NodeStyle),
		Message(String),
	}

	#[derive(Default)]
	struct Recorder(Vec<Call>);

	impl Recorder {
		fn nodes(&self) -> Vec<(&str, &NodeStyle)> {
			self.0
				.iter()
				.filter_map(|c| match c {
					Call::Node(label, style) => Some((label.as_str(), style)),
					_ => None,
				})
				.collect()
		}

		fn links(&self) -> Vec<&LinkStyle> {
			self.0
				.iter()
				.filter_map(|c| match c {
					Call::Link(style) => Some(style),
					_ => None,
				})
				.collect()
		}
	}

	impl Scene for Recorder {
		fn clear(&mut self, _: f64, _: f64) {
			self.0.push(Call::Clear);
		}
		fn push_transform(&mut self, _: &ViewTransform) {
			self.0.push(Call::Push);
		}
		fn pop_transform(&mut self) {
			self.0.push(Call::Pop);
		}
		fn draw_link(&mut self, _: Point, _: Point, style: &LinkStyle) {
			self.0.push(Call::Link(style.clone()));
		}
		fn draw_node(&mut self, _: Point, label: &str, style: &NodeStyle) {
			self.0.push(Call::Node(label.to_string(), style.clone()));
		}
		fn draw_message(&mut self, _: f64, _: f64, text: &str) {
			self.0.push(Call::Message(text.to_string()));
		}
	}

	fn state() -> ForceGraphState {
		let graph = Graph::normalize(
			vec![node("a", "主角"), node("b", "贾府"), node("c", "次要角色"), node("d", "贾府")],
			vec![
				link("a", "b", "亲属", 4.0),
				link("b", "c", "主仆", 1.0),
				link("c", "d", "社交", 1.0),
			],
		);
		ForceGraphState::new(graph, 800.0, 600.0)
	}

	#[test]
	fn draws_links_before_nodes_inside_the_transform() {
		let s = state();
		let mut rec = Recorder::default();
		render(&s, &mut rec);

		assert_eq!(rec.0.first(), Some(&Call::Clear));
		assert_eq!(rec.0[1], Call::Push);
		assert_eq!(rec.0.last(), Some(&Call::Pop));
		assert!(matches!(rec.0[2], Call::Link(_)));
		assert_eq!(rec.links().len(), 3);
		assert_eq!(rec.nodes().len(), 4);
		let first_node = rec.0.iter().position(|c| matches!(c, Call::Node(..))).unwrap();
		let last_link = rec.0.iter().rposition(|c| matches!(c, Call::Link(_))).unwrap();
		assert!(last_link < first_node);
		assert!(rec.links().iter().all(|l| l.color.a == LINK_OPACITY));
	}

	#[test]
	fn selection_dims_unrelated_elements_and_draws_selected_last() {
		let mut s = state();
		s.select(s.graph.node_by_id("b").unwrap());
		let mut rec = Recorder::default();
		render(&s, &mut rec);

		let nodes = rec.nodes();
		assert_eq!(nodes.last().map(|(label, _)| *label), Some("b"));
		let d = nodes.iter().find(|(label, _)| *label == "d").unwrap().1;
		assert_eq!(d.fill.a, DIMMED_NODE_OPACITY);
		let a = nodes.iter().find(|(label, _)| *label == "a").unwrap().1;
		assert_eq!(a.fill.a, 1.0);

		let alphas: Vec<_> = rec.links().iter().map(|l| l.color.a).collect();
		assert_eq!(alphas, vec![1.0, 1.0, DIMMED_LINK_OPACITY]);
	}

	#[test]
	fn only_the_filtered_view_is_drawn() {
		let mut s = state();
		s.toggle_relation(RelationType::Kinship, true);
		let mut rec = Recorder::default();
		render(&s, &mut rec);
		assert_eq!(rec.links().len(), 1);
		let labels: Vec<_> = rec.nodes().into_iter().map(|(l, _)| l).collect();
		assert_eq!(labels, vec!["a", "b"]);
		assert!(!rec.0.iter().any(|c| matches!(c, Call::Message(_))));
	}
}
