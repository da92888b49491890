//! Derives the visible subset of the graph from the filter controls.

use std::collections::BTreeSet;

use super::graph::{Graph, LinkIdx, NodeIdx};
use super::types::{GraphNode, RelationType};

/// Current state of the relation checkboxes, group selector and search box.
///
/// Relation checkboxes are mutually exclusive: at most one type is active.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
	/// The checked relation type, if any.
	pub relation: Option<RelationType>,
	/// Matches a node's group label or its family.
	pub group: Option<String>,
	/// Search box text; non-empty overrides the other filters.
	pub query: String,
}

impl FilterState {
	/// Apply a checkbox change. Checking a type replaces any other checked
	/// type; unchecking the active one leaves none.
	pub fn toggle_relation(&mut self, kind: RelationType, checked: bool) {
		if checked {
			self.relation = Some(kind);
		} else if self.relation.as_ref() == Some(&kind) {
			self.relation = None;
		}
	}

	/// Nothing checked, no group, empty search.
	pub fn is_default(&self) -> bool {
		*self == Self::default()
	}

	/// Derive the visible subset.
	pub fn apply(&self, graph: &Graph) -> GraphView {
		let query = self.query.trim().to_lowercase();
		if !query.is_empty() {
			let nodes = graph
				.node_indices()
				.filter(|&n| matches_query(graph.node(n), &query))
				.collect();
			return GraphView::induced(graph, nodes);
		}

		let links: Vec<LinkIdx> = match &self.relation {
			Some(kind) => graph
				.link_indices()
				.filter(|&l| graph.link(l).kind == *kind)
				.collect(),
			None => graph.link_indices().collect(),
		};

		let candidates: BTreeSet<NodeIdx> = if self.relation.is_some() {
			links
				.iter()
				.flat_map(|&l| {
					let link = graph.link(l);
					[link.source, link.target]
				})
				.collect()
		} else {
			graph.node_indices().collect()
		};

		match &self.group {
			None => GraphView {
				nodes: candidates,
				links,
			},
			Some(group) => {
				let nodes = candidates
					.into_iter()
					.filter(|&n| matches_group(graph.node(n), group))
					.collect::<BTreeSet<_>>();
				let links = links
					.into_iter()
					.filter(|&l| {
						let link = graph.link(l);
						nodes.contains(&link.source) && nodes.contains(&link.target)
					})
					.collect();
				GraphView { nodes, links }
			}
		}
	}
}

/// Case-insensitive substring match on id or description. `query` must
/// already be lowercase.
pub fn matches_query(node: &GraphNode, query: &str) -> bool {
	node.id.to_lowercase().contains(query)
		|| node
			.description
			.as_ref()
			.is_some_and(|d| d.to_lowercase().contains(query))
}

pub fn matches_group(node: &GraphNode, group: &str) -> bool {
	node.group.label() == group || node.family.as_deref() == Some(group)
}

/// A subset of the graph. Nodes are ordered by index; links keep document
/// order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphView {
	pub nodes: BTreeSet<NodeIdx>,
	pub links: Vec<LinkIdx>,
}

impl GraphView {
	/// Everything.
	pub fn full(graph: &Graph) -> Self {
		Self {
			nodes: graph.node_indices().collect(),
			links: graph.link_indices().collect(),
		}
	}

	/// The given nodes and every link between two of them.
	pub fn induced(graph: &Graph, nodes: BTreeSet<NodeIdx>) -> Self {
		let links = graph
			.link_indices()
			.filter(|&l| {
				let link = graph.link(l);
				nodes.contains(&link.source) && nodes.contains(&link.target)
			})
			.collect();
		Self { nodes, links }
	}

	pub fn contains_node(&self, idx: NodeIdx) -> bool {
		self.nodes.contains(&idx)
	}
}

/// Group filter choices: known groups in legend order, then any other group
/// or family label found in the data.
pub fn group_options(graph: &Graph) -> Vec<String> {
	use super::types::Group;

	let mut options: Vec<String> = Group::DISPLAY_ORDER
		.iter()
		.map(|g| g.label().to_string())
		.collect();
	let extra: BTreeSet<&str> = graph
		.nodes()
		.iter()
		.flat_map(|n| [Some(n.group.label()), n.family.as_deref()])
		.flatten()
		.filter(|label| !options.iter().any(|o| o == label))
		.collect();
	options.extend(extra.into_iter().map(String::from));
	options
}
