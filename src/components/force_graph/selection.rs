//! Selected node, the emphasis it implies, and the info panel contents.

use std::collections::HashSet;

use super::graph::{Graph, LinkIdx, NodeIdx};

/// Number of relations listed in the info panel.
pub const MAX_RELATIONS: usize = 10;

/// At most one node is selected at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
	#[default]
	Idle,
	Selected {
		node: NodeIdx,
		links: HashSet<LinkIdx>,
		neighbors: HashSet<NodeIdx>,
	},
}

impl Selection {
	/// Select `node`, replacing any previous selection. Incident links come
	/// from the full graph so the emphasis does not depend on the filter.
	pub fn select(graph: &Graph, node: NodeIdx) -> Self {
		let links: HashSet<LinkIdx> = graph.incident_links(node).collect();
		let neighbors = links.iter().map(|&l| graph.link(l).other(node)).collect();
		Selection::Selected {
			node,
			links,
			neighbors,
		}
	}

	pub fn node(&self) -> Option<NodeIdx> {
		match self {
			Selection::Idle => None,
			Selection::Selected { node, .. } => Some(*node),
		}
	}

	pub fn is_idle(&self) -> bool {
		matches!(self, Selection::Idle)
	}

	pub fn node_emphasis(&self, idx: NodeIdx) -> NodeEmphasis {
		match self {
			Selection::Idle => NodeEmphasis::Normal,
			Selection::Selected { node, neighbors, .. } => {
				if *node == idx {
					NodeEmphasis::Selected
				} else if neighbors.contains(&idx) {
					NodeEmphasis::Neighbor
				} else {
					NodeEmphasis::Dimmed
				}
			}
		}
	}

	pub fn link_emphasis(&self, idx: LinkIdx) -> LinkEmphasis {
		match self {
			Selection::Idle => LinkEmphasis::Normal,
			Selection::Selected { links, .. } if links.contains(&idx) => LinkEmphasis::Highlighted,
			Selection::Selected { .. } => LinkEmphasis::Dimmed,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeEmphasis {
	Normal,
	Selected,
	Neighbor,
	Dimmed,
}

impl NodeEmphasis {
	/// Drawing layer; higher layers are painted over lower ones.
	pub fn layer(self) -> u8 {
		match self {
			NodeEmphasis::Normal | NodeEmphasis::Dimmed => 0,
			NodeEmphasis::Neighbor => 1,
			NodeEmphasis::Selected => 2,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkEmphasis {
	Normal,
	Highlighted,
	Dimmed,
}

/// One line of the relation list.
#[derive(Clone, Debug, PartialEq)]
pub struct Relation {
	pub other: String,
	/// Link description, or the relation type when there is none.
	pub text: String,
	pub value: f64,
}

/// Contents of the info panel for one character.
#[derive(Clone, Debug, PartialEq)]
pub struct InfoPanel {
	pub name: String,
	pub image: Option<String>,
	pub description: Option<String>,
	pub relations: Vec<Relation>,
}

impl InfoPanel {
	pub fn for_node(graph: &Graph, idx: NodeIdx) -> Self {
		let node = graph.node(idx);
		Self {
			name: node.id.clone(),
			image: node.image.as_deref().map(|image| image_path(&node.id, image)),
			description: node.description.clone(),
			relations: top_relations(graph, idx),
		}
	}
}

/// Images named after the English spelling (`...Img.jpg`) are stored under
/// the character's own name instead.
pub fn image_path(id: &str, image: &str) -> String {
	if image.contains("Img.jpg") {
		format!("images/{}.jpg", id)
	} else {
		format!("images/{}", image)
	}
}

/// The strongest relations of `idx`, heaviest first. The sort is stable so
/// equal weights keep document order.
pub fn top_relations(graph: &Graph, idx: NodeIdx) -> Vec<Relation> {
	let mut links: Vec<LinkIdx> = graph.incident_links(idx).collect();
	links.sort_by(|&a, &b| graph.link(b).value.total_cmp(&graph.link(a).value));
	links
		.into_iter()
		.take(MAX_RELATIONS)
		.map(|l| {
			let link = graph.link(l);
			Relation {
				other: graph.node(link.other(idx)).id.clone(),
				text: link
					.description
					.clone()
					.unwrap_or_else(|| link.kind.label().to_string()),
				value: link.value,
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::graph::tests::{link, node};

	fn star(n: usize) -> Graph {
		let mut nodes = vec![node("hub", "主角")];
		let mut links = Vec::new();
		for i in 0..n {
			let id = format!("n{i}");
			nodes.push(node(&id, "次要角色"));
			links.push(link("hub", &id, "社交", (i % 4) as f64));
		}
		nodes.push(node("loner", "贾府"));
		links.push(link("n0", "n1", "亲属", 1.0));
		Graph::normalize(nodes, links)
	}

	#[test]
	fn selection_highlights_exactly_incident_links_and_neighbors() {
		let graph = star(5);
		let n0 = graph.node_by_id("n0").unwrap();
		let selection = Selection::select(&graph, n0);

		for l in graph.link_indices() {
			let expected = graph.link(l).touches(n0);
			assert_eq!(
				selection.link_emphasis(l) == LinkEmphasis::Highlighted,
				expected
			);
		}
		let neighbors: Vec<_> = graph
			.node_indices()
			.filter(|&n| selection.node_emphasis(n) == NodeEmphasis::Neighbor)
			.map(|n| graph.node(n).id.clone())
			.collect();
		assert_eq!(neighbors, vec!["hub", "n1"]);
		assert_eq!(selection.node_emphasis(n0), NodeEmphasis::Selected);
		let loner = graph.node_by_id("loner").unwrap();
		assert_eq!(selection.node_emphasis(loner), NodeEmphasis::Dimmed);
	}

	#[test]
	fn idle_emphasizes_nothing() {
		let graph = star(3);
		let selection = Selection::default();
		assert!(selection.is_idle());
		assert!(graph
			.node_indices()
			.all(|n| selection.node_emphasis(n) == NodeEmphasis::Normal));
		assert!(graph
			.link_indices()
			.all(|l| selection.link_emphasis(l) == LinkEmphasis::Normal));
	}

	#[test]
	fn relations_are_capped_and_sorted_by_weight() {
		let graph = star(14);
		let hub = graph.node_by_id("hub").unwrap();
		let relations = top_relations(&graph, hub);

		assert_eq!(relations.len(), MAX_RELATIONS);
		assert!(relations.windows(2).all(|w| w[0].value >= w[1].value));
		// weights cycle 0,1,2,3: the three 3s first, then the first 2, in document order
		let first: Vec<_> = relations.iter().take(4).map(|r| r.other.as_str()).collect();
		assert_eq!(first, vec!["n3", "n7", "n11", "n2"]);
	}

	#[test]
	fn relation_text_falls_back_to_type() {
		let mut described = link("a", "b", "婚姻", 5.0);
		described.description = Some("夫妻".into());
		let graph = Graph::normalize(
			vec![node("a", "贾府"), node("b", "贾府"), node("c", "贾府")],
			vec![described, link("c", "a", "亲属", 2.0)],
		);
		let a = graph.node_by_id("a").unwrap();
		let panel = InfoPanel::for_node(&graph, a);
		assert_eq!(panel.name, "a");
		assert_eq!(panel.relations[0].other, "b");
		assert_eq!(panel.relations[0].text, "夫妻");
		assert_eq!(panel.relations[1].other, "c");
		assert_eq!(panel.relations[1].text, "亲属");
	}

	#[test]
	fn image_paths() {
		assert_eq!(image_path("贾宝玉", "baoyuImg.jpg"), "images/贾宝玉.jpg");
		assert_eq!(image_path("贾宝玉", "portrait.png"), "images/portrait.png");
	}
}
