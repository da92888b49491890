use log::{debug, info};

use super::filter::{FilterState, GraphView};
use super::graph::{Graph, LinkIdx, NodeIdx};
use super::layout::{Layout, LayoutConfig, Position};
use super::scene::Point;
use super::selection::{InfoPanel, Selection};
use super::style::NodeStyle;
use super::types::RelationType;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 4.0;
/// Pointer travel (screen px) below which a press-release is a click.
const CLICK_SLOP: f64 = 3.0;
/// Distance (graph units) from a link's line that still counts as hovering it.
const LINK_HIT_TOLERANCE: f64 = 4.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<NodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	pub moved: bool,
}

/// What the pointer is over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Hover {
	#[default]
	None,
	Node(NodeIdx),
	Link(LinkIdx),
}

/// Tooltip text for the hovered element.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub title: String,
	pub lines: Vec<String>,
}

/// Everything the graph page knows: data, filters, the derived view,
/// selection, layout and pan/zoom. UI handlers call into this and then
/// re-read what they display.
pub struct ForceGraphState {
	/// The full graph as loaded.
	pub graph: Graph,
	/// Control values behind [`Self::view`].
	pub filter: FilterState,
	/// What the filters currently let through.
	pub view: GraphView,
	/// Drives node and link emphasis.
	pub selection: Selection,
	/// Stays open after "reset highlight" clears the selection.
	pub info: Option<InfoPanel>,
	/// Positions of the visible nodes.
	pub layout: Layout,
	/// Pan and zoom applied when drawing.
	pub transform: ViewTransform,
	/// Node being dragged, if any.
	pub drag: DragState,
	/// Background drag in progress.
	pub pan: PanState,
	/// Element under the pointer, for tooltips.
	pub hover: Hover,
	/// Canvas width in screen pixels.
	pub width: f64,
	/// Canvas height in screen pixels.
	pub height: f64,
}

impl ForceGraphState {
	/// Show the whole graph with the default forces.
	pub fn new(graph: Graph, width: f64, height: f64) -> Self {
		Self::with_config(graph, LayoutConfig::default(), width, height)
	}

	/// Like [`Self::new`] with custom layout forces.
	pub fn with_config(graph: Graph, config: LayoutConfig, width: f64, height: f64) -> Self {
		let view = GraphView::full(&graph);
		let mut layout = Layout::new(config, graph.nodes().len(), width, height);
		layout.set_view(&graph, &view);
		Self {
			graph,
			filter: FilterState::default(),
			view,
			selection: Selection::default(),
			info: None,
			layout,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: Hover::None,
			width,
			height,
		}
	}

	/// Undo the pan/zoom transform.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Layout position in graph coordinates.
	pub fn node_point(&self, idx: NodeIdx) -> Option<Point> {
		self.layout
			.position(idx)
			.map(|p| Point::new(p.x as f64, p.y as f64))
	}

	/// Style for the node under the current selection.
	pub fn node_style(&self, idx: NodeIdx) -> NodeStyle {
		NodeStyle::new(&self.graph.node(idx).group, self.selection.node_emphasis(idx))
	}

	/// Topmost visible node under the screen point, in the order
	/// [`render`](super::render::render) paints them.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found: Option<(u8, NodeIdx)> = None;
		for &idx in &self.view.nodes {
			let Some(p) = self.node_point(idx) else {
				continue;
			};
			let (dx, dy) = (p.x - gx, p.y - gy);
			if (dx * dx + dy * dy).sqrt() >= self.node_style(idx).hit_radius() {
				continue;
			}
			let layer = self.selection.node_emphasis(idx).layer();
			if found.is_none_or(|(top, _)| layer >= top) {
				found = Some((layer, idx));
			}
		}
		found.map(|(_, idx)| idx)
	}

	/// Visible link whose line passes near the screen point.
	pub fn link_at_position(&self, sx: f64, sy: f64) -> Option<LinkIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let point = Point::new(gx, gy);
		self.view.links.iter().rev().copied().find(|&l| {
			let link = self.graph.link(l);
			match (self.node_point(link.source), self.node_point(link.target)) {
				(Some(a), Some(b)) => {
					let half_width = link.value.max(0.0).sqrt() / 2.0;
					distance_to_segment(point, a, b) <= half_width + LINK_HIT_TOLERANCE
				}
				_ => false,
			}
		})
	}

	/// Highlight `idx` and open its info panel.
	pub fn select(&mut self, idx: NodeIdx) {
		debug!("Selected {}", self.graph.node(idx).id);
		self.selection = Selection::select(&self.graph, idx);
		self.info = Some(InfoPanel::for_node(&self.graph, idx));
	}

	/// Back to idle and close the info panel.
	pub fn clear_selection(&mut self) {
		self.selection = Selection::Idle;
		self.info = None;
	}

	/// Drop the emphasis but keep the info panel open.
	pub fn reset_highlight(&mut self) {
		self.selection = Selection::Idle;
	}

	/// A relation checkbox changed.
	pub fn toggle_relation(&mut self, kind: RelationType, checked: bool) {
		self.filter.toggle_relation(kind, checked);
		self.apply_filters();
	}

	/// `None` or an empty string clears the group filter.
	pub fn set_group(&mut self, group: Option<String>) {
		self.filter.group = group.filter(|g| !g.is_empty());
		self.apply_filters();
	}

	/// The search box changed.
	pub fn set_query(&mut self, query: &str) {
		self.filter.query = query.to_string();
		self.apply_filters();
	}

	/// Recompute the view, restart the layout on it and clear the selection.
	/// A search with exactly one hit selects it.
	pub fn apply_filters(&mut self) {
		self.view = self.filter.apply(&self.graph);
		self.layout.set_view(&self.graph, &self.view);
		self.clear_selection();
		self.hover = Hover::None;
		info!(
			"Showing {} of {} nodes, {} of {} links",
			self.view.nodes.len(),
			self.graph.nodes().len(),
			self.view.links.len(),
			self.graph.links().len()
		);

		if !self.filter.query.trim().is_empty() && self.view.nodes.len() == 1 {
			if let Some(&only) = self.view.nodes.first() {
				self.select(only);
			}
		}
	}

	/// Default filters, identity zoom, full graph, nothing selected.
	pub fn reset_view(&mut self) {
		self.filter = FilterState::default();
		self.transform = ViewTransform::default();
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.apply_filters();
	}

	/// Press on a node starts a drag, anywhere else a pan.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if let Some(idx) = self.node_at_position(sx, sy) {
			let start = self.layout.position(idx).unwrap_or_default();
			self.drag = DragState {
				node: Some(idx),
				start_x: sx,
				start_y: sy,
				node_start: start,
				moved: false,
			};
			self.layout.start_drag(idx, start);
		} else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
				moved: false,
			};
		}
	}

	/// Drag, pan or update the hover target.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let Some(idx) = self.drag.node {
			let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
			if dx.hypot(dy) > CLICK_SLOP {
				self.drag.moved = true;
			}
			let (dx, dy) = (dx / self.transform.k, dy / self.transform.k);
			let pos = Position::new(
				self.drag.node_start.x + dx as f32,
				self.drag.node_start.y + dy as f32,
			);
			self.layout.drag_to(idx, pos);
		} else if self.pan.active {
			let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
			if dx.hypot(dy) > CLICK_SLOP {
				self.pan.moved = true;
			}
			self.transform.x = self.pan.transform_start_x + dx;
			self.transform.y = self.pan.transform_start_y + dy;
		} else {
			self.hover = match self.node_at_position(sx, sy) {
				Some(idx) => Hover::Node(idx),
				None => self
					.link_at_position(sx, sy)
					.map_or(Hover::None, Hover::Link),
			};
		}
	}

	/// Ends a drag or pan. A press-release without movement is a click: on a
	/// node it selects, on empty canvas it clears the selection.
	pub fn pointer_up(&mut self) {
		if let Some(idx) = self.drag.node.take() {
			self.layout.end_drag(idx);
			if !self.drag.moved {
				self.select(idx);
			}
		} else if self.pan.active
			&& !self.pan.moved
			&& (self.info.is_some() || !self.selection.is_idle())
		{
			self.clear_selection();
		}
		self.drag = DragState::default();
		self.pan = PanState::default();
	}

	/// Pointer left the canvas: drop any drag or pan without clicking.
	pub fn pointer_leave(&mut self) {
		if let Some(idx) = self.drag.node.take() {
			self.layout.end_drag(idx);
		}
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.hover = Hover::None;
	}

	/// Zoom around the screen point, clamped to [`MIN_ZOOM`, `MAX_ZOOM`].
	/// Horizontal-only wheel events (`delta_y == 0`) are ignored.
	pub fn zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		if delta_y == 0.0 {
			return;
		}
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Node tooltips are hidden while a node is selected.
	pub fn tooltip(&self) -> Option<Tooltip> {
		match self.hover {
			Hover::None => None,
			Hover::Node(_) if !self.selection.is_idle() => None,
			Hover::Node(idx) => {
				let node = self.graph.node(idx);
				let mut lines = vec![node.group.label().to_string()];
				lines.extend(node.family.clone());
				Some(Tooltip {
					title: node.id.clone(),
					lines,
				})
			}
			Hover::Link(l) => {
				let link = self.graph.link(l);
				let mut lines = vec![format!("{}关系", link.kind)];
				lines.extend(link.description.clone());
				Some(Tooltip {
					title: format!(
						"{} → {}",
						self.graph.node(link.source).id,
						self.graph.node(link.target).id
					),
					lines,
				})
			}
		}
	}

	/// Advance the layout by `dt` seconds.
	pub fn tick(&mut self, dt: f32) -> bool {
		self.layout.tick(dt)
	}

	/// The canvas changed size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.layout.resize(width, height);
	}
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
	let (abx, aby) = (b.x - a.x, b.y - a.y);
	let len2 = abx * abx + aby * aby;
	let t = if len2 == 0.0 {
		0.0
	} else {
		(((p.x - a.x) * abx + (p.y - a.y) * aby) / len2).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.x + t * abx, a.y + t * aby);
	(p.x - cx).hypot(p.y - cy)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::graph::tests::{link, node};
	use crate::components::force_graph::selection::{LinkEmphasis, NodeEmphasis};

	fn state() -> ForceGraphState {
		let mut daiyu = node("林黛玉", "金陵十二钗正册");
		daiyu.family = Some("林府".into());
		let graph = Graph::normalize(
			vec![
				node("贾宝玉", "主角"),
				daiyu,
				node("薛宝钗", "金陵十二钗正册"),
				node("袭人", "次要角色"),
			],
			vec![
				link("贾宝玉", "林黛玉", "特殊", 10.0),
				link("贾宝玉", "薛宝钗", "婚姻", 9.0),
				link("袭人", "贾宝玉", "主仆", 6.0),
			],
		);
		ForceGraphState::new(graph, 800.0, 600.0)
	}

	fn screen_of(state: &ForceGraphState, idx: NodeIdx) -> (f64, f64) {
		let p = state.node_point(idx).unwrap();
		(
			p.x * state.transform.k + state.transform.x,
			p.y * state.transform.k + state.transform.y,
		)
	}

	fn id(state: &ForceGraphState, name: &str) -> NodeIdx {
		state.graph.node_by_id(name).unwrap()
	}

	#[test]
	fn click_on_node_selects_it() {
		let mut s = state();
		let baoyu = id(&s, "贾宝玉");
		let (x, y) = screen_of(&s, baoyu);
		s.pointer_down(x, y);
		s.pointer_up();

		assert_eq!(s.selection.node(), Some(baoyu));
		let info = s.info.as_ref().unwrap();
		assert_eq!(info.name, "贾宝玉");
		let others: Vec<_> = info.relations.iter().map(|r| r.other.as_str()).collect();
		assert_eq!(others, vec!["林黛玉", "薛宝钗", "袭人"]);
		assert!(s.graph.link_indices().all(|l| s.selection.link_emphasis(l) == LinkEmphasis::Highlighted));
	}

	#[test]
	fn selecting_another_node_replaces_the_selection() {
		let mut s = state();
		s.select(id(&s, "贾宝玉"));
		let xiren = id(&s, "袭人");
		s.select(xiren);
		assert_eq!(s.selection.node(), Some(xiren));
		assert_eq!(s.selection.node_emphasis(id(&s, "林黛玉")), NodeEmphasis::Dimmed);
		assert_eq!(s.info.as_ref().unwrap().name, "袭人");
	}

	#[test]
	fn click_on_empty_canvas_clears_selection() {
		let mut s = state();
		s.select(id(&s, "贾宝玉"));
		s.transform.x = 10_000.0;
		s.pointer_down(1.0, 1.0);
		s.pointer_up();
		assert!(s.selection.is_idle());
		assert!(s.info.is_none());
	}

	#[test]
	fn dragging_a_node_moves_it_without_selecting() {
		let mut s = state();
		let daiyu = id(&s, "林黛玉");
		let (x, y) = screen_of(&s, daiyu);
		let start = s.layout.position(daiyu).unwrap();
		s.pointer_down(x, y);
		s.pointer_move(x + 40.0, y + 20.0);
		s.tick(0.016);
		let moved = s.layout.position(daiyu).unwrap();
		assert_eq!(moved, Position::new(start.x + 40.0, start.y + 20.0));
		s.pointer_up();
		assert!(s.selection.is_idle());
		assert!(s.drag.node.is_none());
	}

	#[test]
	fn panning_moves_the_transform() {
		let mut s = state();
		s.transform.x = 10_000.0;
		s.pointer_down(5.0, 5.0);
		s.pointer_move(25.0, 15.0);
		s.pointer_up();
		assert_eq!((s.transform.x, s.transform.y), (10_020.0, 10.0));
	}

	#[test]
	fn zoom_is_clamped_and_anchored() {
		let mut s = state();
		for _ in 0..100 {
			s.zoom(400.0, 300.0, -1.0);
		}
		assert_eq!(s.transform.k, MAX_ZOOM);
		let (gx, gy) = s.screen_to_graph(400.0, 300.0);
		assert!((gx - 400.0).abs() < 1e-9 && (gy - 300.0).abs() < 1e-9);
		for _ in 0..200 {
			s.zoom(0.0, 0.0, 1.0);
		}
		assert_eq!(s.transform.k, MIN_ZOOM);
	}

	#[test]
	fn filter_change_clears_selection_and_restarts_layout() {
		let mut s = state();
		s.select(id(&s, "贾宝玉"));
		s.layout.stop();
		s.toggle_relation(RelationType::Marriage, true);

		assert!(s.selection.is_idle());
		assert!(s.info.is_none());
		assert!(s.layout.is_running());
		assert_eq!(s.view.nodes.len(), 2);
		assert_eq!(s.view.links.len(), 1);
	}

	#[test]
	fn unique_search_hit_is_selected() {
		let mut s = state();
		s.set_query("袭");
		assert_eq!(s.view.nodes.len(), 1);
		assert_eq!(s.selection.node(), Some(id(&s, "袭人")));
		assert_eq!(s.info.as_ref().unwrap().name, "袭人");

		s.set_query("宝");
		assert_eq!(s.view.nodes.len(), 2);
		assert!(s.selection.is_idle());
	}

	#[test]
	fn reset_view_restores_everything() {
		let mut s = state();
		s.toggle_relation(RelationType::Special, true);
		s.set_group(Some("林府".into()));
		s.set_query("黛");
		s.zoom(100.0, 100.0, -1.0);
		s.reset_view();

		assert!(s.filter.is_default());
		assert_eq!(s.view, GraphView::full(&s.graph));
		assert!(s.selection.is_idle());
		assert!(s.info.is_none());
		assert_eq!(s.transform, ViewTransform::default());
	}

	#[test]
	fn reset_highlight_keeps_the_panel() {
		let mut s = state();
		s.select(id(&s, "薛宝钗"));
		s.reset_highlight();
		assert!(s.selection.is_idle());
		assert_eq!(s.info.as_ref().unwrap().name, "薛宝钗");
	}

	#[test]
	fn empty_click_closes_the_panel_left_by_reset_highlight() {
		let mut s = state();
		s.select(id(&s, "薛宝钗"));
		s.reset_highlight();
		s.transform.x = 10_000.0;
		s.pointer_down(5.0, 5.0);
		s.pointer_up();
		assert!(s.selection.is_idle());
		assert!(s.info.is_none());
	}

	#[test]
	fn overlapping_nodes_hit_the_one_drawn_on_top() {
		let mut s = state();
		let (daiyu, baochai) = (id(&s, "林黛玉"), id(&s, "薛宝钗"));
		let spot = Position::new(600.0, 500.0);
		s.layout.drag_to(daiyu, spot);
		s.layout.drag_to(baochai, spot);
		assert_eq!(s.node_at_position(600.0, 500.0), Some(baochai));

		s.select(daiyu);
		assert_eq!(s.node_at_position(600.0, 500.0), Some(daiyu));
	}

	#[test]
	fn horizontal_scroll_does_not_zoom() {
		let mut s = state();
		s.zoom(400.0, 300.0, 0.0);
		assert_eq!(s.transform, ViewTransform::default());
	}

	#[test]
	fn empty_group_selection_means_no_filter() {
		let mut s = state();
		s.set_group(Some(String::new()));
		assert!(s.filter.is_default());
	}

	#[test]
	fn tooltips() {
		let mut s = state();
		let daiyu = id(&s, "林黛玉");
		s.hover = Hover::Node(daiyu);
		assert_eq!(
			s.tooltip(),
			Some(Tooltip {
				title: "林黛玉".into(),
				lines: vec!["金陵十二钗正册".into(), "林府".into()],
			})
		);

		s.select(daiyu);
		assert_eq!(s.tooltip(), None);

		s.hover = Hover::Link(LinkIdx(1));
		let tip = s.tooltip().unwrap();
		assert_eq!(tip.title, "贾宝玉 → 薛宝钗");
		assert_eq!(tip.lines, vec!["婚姻关系".to_string()]);
	}

	#[test]
	fn hovering_finds_nodes_then_links() {
		let mut s = state();
		let baoyu = id(&s, "贾宝玉");
		let (x, y) = screen_of(&s, baoyu);
		s.pointer_move(x, y);
		assert_eq!(s.hover, Hover::Node(baoyu));

		let daiyu = s.node_point(id(&s, "林黛玉")).unwrap();
		let bao = s.node_point(baoyu).unwrap();
		let (mx, my) = ((daiyu.x + bao.x) / 2.0, (daiyu.y + bao.y) / 2.0);
		if s.node_at_position(mx, my).is_none() {
			s.pointer_move(mx, my);
			assert_eq!(s.hover, Hover::Link(LinkIdx(0)));
		}
	}

	#[test]
	fn segment_distance() {
		let a = Point::new(0.0, 0.0);
		let b = Point::new(10.0, 0.0);
		assert_eq!(distance_to_segment(Point::new(5.0, 3.0), a, b), 3.0);
		assert_eq!(distance_to_segment(Point::new(-4.0, 3.0), a, b), 5.0);
		assert_eq!(distance_to_segment(Point::new(1.0, 1.0), a, a), 2f64.sqrt());
	}
}
