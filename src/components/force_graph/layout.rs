//! Force layout over the visible subset.
//!
//! `force_graph` does charge repulsion, spring attraction and integration.
//! Every tick then applies, in order: link distance, collision, centering,
//! axis pull, the minor-role pull, the bounds clamp, and finally the drag
//! pins. Energy (`alpha`) cools toward `alpha_target` and the layout stops
//! once it is spent.

use std::collections::HashMap;
use std::f32::consts::PI;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::filter::GraphView;
use super::graph::{Graph, NodeIdx};

/// Force constants and the cooling schedule.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	pub charge: f32,
	pub spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping: f32,
	pub mass: f32,
	/// Target length of every link.
	pub link_distance: f32,
	/// Fraction of the centroid offset removed per tick.
	pub center_strength: f32,
	pub collide_radius: f32,
	/// Per-axis pull toward the canvas center, scaled by alpha.
	pub axis_strength: f32,
	/// Fraction of a far minor node's offset removed per tick.
	pub minor_pull: f32,
	/// Minor nodes farther than `min(w, h) * ratio` from center get pulled.
	pub minor_radius_ratio: f32,
	/// Nodes stay at least this far inside the canvas.
	pub margin: f32,
	/// Radius of the circle new nodes are placed on.
	pub seed_radius: f32,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	/// Energy kept while a node is dragged.
	pub drag_alpha_target: f64,
	/// Energy after a resize.
	pub resize_alpha: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			charge: 200.0,
			spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping: 0.9,
			mass: 10.0,
			link_distance: 100.0,
			center_strength: 0.01,
			collide_radius: 20.0,
			axis_strength: 0.1,
			minor_pull: 0.03,
			minor_radius_ratio: 1.0 / 3.0,
			margin: 15.0,
			seed_radius: 100.0,
			alpha_min: 0.001,
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
			resize_alpha: 0.3,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	pub x: f32,
	pub y: f32,
}

impl Position {
	pub fn new(x: f32, y: f32) -> Self {
		Self { x, y }
	}

	fn is_finite(&self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

#[derive(Clone, Copy, Debug, Default)]
struct LayoutNode {
	idx: NodeIdx,
	minor: bool,
}

pub struct Layout {
	config: LayoutConfig,
	sim: ForceGraph<LayoutNode, ()>,
	/// Last known position of every graph node, kept across views.
	positions: Vec<Option<Position>>,
	pins: HashMap<NodeIdx, Position>,
	/// Current view's links as endpoint pairs, self-loops excluded.
	links: Vec<(NodeIdx, NodeIdx)>,
	visible: usize,
	width: f32,
	height: f32,
	alpha: f64,
	alpha_target: f64,
	running: bool,
}

impl Layout {
	pub fn new(config: LayoutConfig, node_count: usize, width: f64, height: f64) -> Self {
		let sim = ForceGraph::new(Self::parameters(&config));
		Self {
			config,
			sim,
			positions: vec![None; node_count],
			pins: HashMap::new(),
			links: Vec::new(),
			visible: 0,
			width: width as f32,
			height: height as f32,
			alpha: 0.0,
			alpha_target: 0.0,
			running: false,
		}
	}

	fn parameters(config: &LayoutConfig) -> SimulationParameters {
		SimulationParameters {
			force_charge: config.charge,
			force_spring: config.spring,
			force_max: config.force_max,
			node_speed: config.node_speed,
			damping_factor: config.damping,
		}
	}

	fn center(&self) -> Position {
		Position::new(self.width / 2.0, self.height / 2.0)
	}

	/// Stop, rebuild the simulation for `view`, and restart at full energy.
	///
	/// Nodes already placed keep their position; nodes seen in an earlier
	/// view come back where they were; new nodes are seeded on a circle
	/// around the center. Pins on nodes leaving the view are released.
	pub fn set_view(&mut self, graph: &Graph, view: &GraphView) {
		self.stop();
		self.sim = ForceGraph::new(Self::parameters(&self.config));
		self.pins.retain(|idx, _| view.contains_node(*idx));

		let center = self.center();
		let total = view.nodes.len().max(1) as f32;
		let mut handles = HashMap::with_capacity(view.nodes.len());
		for (i, &idx) in view.nodes.iter().enumerate() {
			let pos = self.positions[idx.0].unwrap_or_else(|| {
				let angle = i as f32 * 2.0 * PI / total;
				Position::new(
					center.x + self.config.seed_radius * angle.cos(),
					center.y + self.config.seed_radius * angle.sin(),
				)
			});
			self.positions[idx.0] = Some(pos);
			let handle = self.sim.add_node(NodeData {
				x: pos.x,
				y: pos.y,
				mass: self.config.mass,
				is_anchor: self.pins.contains_key(&idx),
				user_data: LayoutNode {
					idx,
					minor: graph.node(idx).group.is_minor(),
				},
			});
			handles.insert(idx, handle);
		}

		self.visible = view.nodes.len();
		self.links.clear();
		for &l in &view.links {
			let link = graph.link(l);
			if link.source == link.target {
				continue;
			}
			if let (Some(&src), Some(&tgt)) = (handles.get(&link.source), handles.get(&link.target)) {
				self.sim.add_edge(src, tgt, EdgeData::default());
				self.links.push((link.source, link.target));
			}
		}

		debug!(
			"Layout rebuilt with {} nodes and {} links",
			view.nodes.len(),
			self.links.len()
		);
		self.restart(1.0);
	}

	pub fn restart(&mut self, alpha: f64) {
		self.alpha = alpha;
		self.running = true;
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn position(&self, idx: NodeIdx) -> Option<Position> {
		self.positions.get(idx.0).copied().flatten()
	}

	pub fn size(&self) -> (f32, f32) {
		(self.width, self.height)
	}

	/// New canvas size; reheats the layout so it settles into the new bounds.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width as f32;
		self.height = height as f32;
		self.restart(self.config.resize_alpha);
	}

	/// Hold `idx` at `pos` and keep the layout warm until [`Layout::end_drag`].
	pub fn start_drag(&mut self, idx: NodeIdx, pos: Position) {
		self.alpha_target = self.config.drag_alpha_target;
		self.running = true;
		self.pin(idx, pos);
	}

	pub fn drag_to(&mut self, idx: NodeIdx, pos: Position) {
		self.pin(idx, pos);
	}

	/// Release the pin and let the layout cool down again.
	pub fn end_drag(&mut self, idx: NodeIdx) {
		self.alpha_target = 0.0;
		self.pins.remove(&idx);
		self.sim.visit_nodes_mut(|node| {
			if node.data.user_data.idx == idx {
				node.data.is_anchor = false;
			}
		});
	}

	fn pin(&mut self, idx: NodeIdx, pos: Position) {
		let pos = clamp_to_bounds(pos, self.width, self.height, self.config.margin);
		self.pins.insert(idx, pos);
		if let Some(slot) = self.positions.get_mut(idx.0) {
			*slot = Some(pos);
		}
		self.sim.visit_nodes_mut(|node| {
			if node.data.user_data.idx == idx {
				node.data.x = pos.x;
				node.data.y = pos.y;
				node.data.is_anchor = true;
			}
		});
	}

	/// Advance one frame. Returns whether anything moved.
	pub fn tick(&mut self, dt: f32) -> bool {
		if !self.running {
			return false;
		}
		if self.visible == 0 {
			self.stop();
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		let alpha = self.alpha as f32;

		self.sim.update(dt * alpha);

		let mut nodes: Vec<(LayoutNode, Position)> = Vec::with_capacity(self.positions.len());
		self.sim.visit_nodes(|node| {
			nodes.push((node.data.user_data, Position::new(node.x(), node.y())));
		});

		for (i, (node, pos)) in nodes.iter_mut().enumerate() {
			if !pos.is_finite() {
				let prev = self.positions[node.idx.0].unwrap_or_else(|| self.center());
				*pos = Position::new(prev.x + i as f32 * 0.1, prev.y - i as f32 * 0.1);
			}
		}

		let slot: HashMap<NodeIdx, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, (node, _))| (node.idx, i))
			.collect();
		let mut positions: Vec<Position> = nodes.iter().map(|(_, p)| *p).collect();
		let links: Vec<(usize, usize)> = self
			.links
			.iter()
			.filter_map(|(s, t)| Some((*slot.get(s)?, *slot.get(t)?)))
			.collect();

		let center = self.center();
		apply_link_distance(&mut positions, &links, self.config.link_distance, alpha);
		apply_collision(&mut positions, self.config.collide_radius);
		apply_centering(&mut positions, center, self.config.center_strength);
		let threshold = self.width.min(self.height) * self.config.minor_radius_ratio;
		for ((node, _), pos) in nodes.iter().zip(positions.iter_mut()) {
			let axis = self.config.axis_strength * alpha;
			pos.x += (center.x - pos.x) * axis;
			pos.y += (center.y - pos.y) * axis;
			if node.minor {
				*pos = pull_toward_center(*pos, center, threshold, self.config.minor_pull);
			}
			*pos = clamp_to_bounds(*pos, self.width, self.height, self.config.margin);
			if let Some(pin) = self.pins.get(&node.idx) {
				*pos = *pin;
			}
			self.positions[node.idx.0] = Some(*pos);
		}

		let stored = &self.positions;
		self.sim.visit_nodes_mut(|node| {
			if let Some(pos) = stored[node.data.user_data.idx.0] {
				node.data.x = pos.x;
				node.data.y = pos.y;
			}
		});

		if self.alpha < self.config.alpha_min {
			debug!("Layout settled");
			self.stop();
		}
		true
	}
}

/// Move linked nodes toward `distance` apart. Each link's strength is
/// `1 / min(degree)` and the correction is split by relative degree, so hubs
/// move less than leaves.
fn apply_link_distance(positions: &mut [Position], links: &[(usize, usize)], distance: f32, alpha: f32) {
	let mut degree = vec![0usize; positions.len()];
	for &(s, t) in links {
		degree[s] += 1;
		degree[t] += 1;
	}
	for &(s, t) in links {
		let (dx, dy) = (positions[t].x - positions[s].x, positions[t].y - positions[s].y);
		let len = (dx * dx + dy * dy).sqrt();
		if len < 1e-3 {
			continue;
		}
		let strength = 1.0 / degree[s].min(degree[t]) as f32;
		let k = (len - distance) / len * alpha * strength;
		let bias = degree[s] as f32 / (degree[s] + degree[t]) as f32;
		positions[t].x -= dx * k * bias;
		positions[t].y -= dy * k * bias;
		positions[s].x += dx * k * (1.0 - bias);
		positions[s].y += dy * k * (1.0 - bias);
	}
}

/// Push overlapping nodes apart so no two centers are closer than
/// `2 * radius`. Coincident nodes are split along an index-dependent angle.
fn apply_collision(positions: &mut [Position], radius: f32) {
	let min_dist = 2.0 * radius;
	for i in 0..positions.len() {
		for j in (i + 1)..positions.len() {
			let (mut dx, mut dy) = (positions[j].x - positions[i].x, positions[j].y - positions[i].y);
			let mut dist = (dx * dx + dy * dy).sqrt();
			if dist >= min_dist {
				continue;
			}
			if dist < 1e-3 {
				let angle = (i * 31 + j * 17) as f32;
				(dx, dy, dist) = (angle.cos() * 1e-3, angle.sin() * 1e-3, 1e-3);
			}
			let push = (min_dist - dist) / dist * 0.5;
			positions[i].x -= dx * push;
			positions[i].y -= dy * push;
			positions[j].x += dx * push;
			positions[j].y += dy * push;
		}
	}
}

/// Shift everything so the centroid moves `strength` of the way to `center`.
fn apply_centering(positions: &mut [Position], center: Position, strength: f32) {
	let n = positions.len() as f32;
	let (sx, sy) = positions
		.iter()
		.fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
	let (ox, oy) = ((sx / n - center.x) * strength, (sy / n - center.y) * strength);
	for p in positions.iter_mut() {
		p.x -= ox;
		p.y -= oy;
	}
}

/// Pull `pos` `factor` of the way back to `center` when it is farther than
/// `threshold`.
pub fn pull_toward_center(pos: Position, center: Position, threshold: f32, factor: f32) -> Position {
	let (dx, dy) = (pos.x - center.x, pos.y - center.y);
	if (dx * dx + dy * dy).sqrt() > threshold {
		Position::new(pos.x - dx * factor, pos.y - dy * factor)
	} else {
		pos
	}
}

/// Keep `pos` inside the canvas minus `margin`. Non-finite coordinates go to
/// the center.
pub fn clamp_to_bounds(pos: Position, width: f32, height: f32, margin: f32) -> Position {
	if !pos.is_finite() {
		return Position::new(width / 2.0, height / 2.0);
	}
	let (max_x, max_y) = ((width - margin).max(margin), (height - margin).max(margin));
	Position::new(pos.x.clamp(margin, max_x), pos.y.clamp(margin, max_y))
}
