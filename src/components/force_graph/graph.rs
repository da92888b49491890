//! The normalized graph: links point at nodes by index instead of by name.

use std::collections::HashMap;

use log::warn;

use super::types::{Endpoint, GraphDocument, GraphLink, GraphNode, RelationType};

/// Position of a node in [`Graph::nodes`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub usize);

/// Position of a link in [`Graph::links`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkIdx(pub usize);

/// A relationship whose endpoints are node references.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	pub source: NodeIdx,
	pub target: NodeIdx,
	pub kind: RelationType,
	pub value: f64,
	pub description: Option<String>,
}

impl Link {
	/// Whether `idx` is one of the endpoints.
	pub fn touches(&self, idx: NodeIdx) -> bool {
		self.source == idx || self.target == idx
	}

	/// The endpoint that isn't `idx`.
	pub fn other(&self, idx: NodeIdx) -> NodeIdx {
		if self.source == idx { self.target } else { self.source }
	}
}

/// The full graph, loaded once. Filtered views index into it and never
/// change its membership.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
	nodes: Vec<GraphNode>,
	links: Vec<Link>,
	by_id: HashMap<String, NodeIdx>,
}

impl Graph {
	/// Resolve every link endpoint to a node reference.
	///
	/// Duplicate node ids keep the first occurrence. Links with an endpoint
	/// that names no node are dropped, so every surviving link is fully
	/// resolved.
	pub fn normalize(nodes: Vec<GraphNode>, links: Vec<GraphLink>) -> Self {
		let mut by_id = HashMap::with_capacity(nodes.len());
		let mut kept = Vec::with_capacity(nodes.len());
		for node in nodes {
			if by_id.contains_key(&node.id) {
				warn!("Dropping duplicate node id {:?}", node.id);
				continue;
			}
			by_id.insert(node.id.clone(), NodeIdx(kept.len()));
			kept.push(node);
		}

		let resolve = |endpoint: &Endpoint| match endpoint {
			Endpoint::Id(id) => by_id.get(id).copied(),
			Endpoint::Index(i) => (*i < kept.len()).then_some(NodeIdx(*i)),
		};

		let mut resolved = Vec::with_capacity(links.len());
		for link in links {
			match (resolve(&link.source), resolve(&link.target)) {
				(Some(source), Some(target)) => resolved.push(Link {
					source,
					target,
					kind: link.kind,
					value: link.value,
					description: link.description,
				}),
				_ => warn!(
					"Dropping link {:?} -> {:?}: endpoint names no node",
					link.source, link.target
				),
			}
		}

		Self {
			nodes: kept,
			links: resolved,
			by_id,
		}
	}

	/// Build from a parsed document. Missing arrays are reported by name.
	pub fn from_document(doc: GraphDocument) -> Result<Self, super::LoadError> {
		let nodes = doc.nodes.ok_or(super::LoadError::MissingField("nodes"))?;
		let links = doc.links.ok_or(super::LoadError::MissingField("links"))?;
		Ok(Self::normalize(nodes, links))
	}

	/// All nodes, in document order.
	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	/// All resolved links, in document order.
	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Panics if `idx` is not from this graph.
	pub fn node(&self, idx: NodeIdx) -> &GraphNode {
		&self.nodes[idx.0]
	}

	/// Panics if `idx` is not from this graph.
	pub fn link(&self, idx: LinkIdx) -> &Link {
		&self.links[idx.0]
	}

	/// Look a character up by name.
	pub fn node_by_id(&self, id: &str) -> Option<NodeIdx> {
		self.by_id.get(id).copied()
	}

	/// Every node reference.
	pub fn node_indices(&self) -> impl Iterator<Item = NodeIdx> + '_ {
		(0..self.nodes.len()).map(NodeIdx)
	}

	/// Every link reference.
	pub fn link_indices(&self) -> impl Iterator<Item = LinkIdx> + '_ {
		(0..self.links.len()).map(LinkIdx)
	}

	/// Links with `idx` as source or target, in document order.
	pub fn incident_links(&self, idx: NodeIdx) -> impl Iterator<Item = LinkIdx> + '_ {
		self.link_indices().filter(move |&l| self.link(l).touches(idx))
	}
}
