//! End-to-end behavior of the explorer state over the bundled data set.

use honglou_graph::{FilterState, ForceGraphState, Graph, RelationType, parse_graph};

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 640.0;

fn sample() -> Graph {
	parse_graph(include_str!("../data/hongloumeng.json")).expect("bundled data parses")
}

fn explorer() -> ForceGraphState {
	ForceGraphState::new(sample(), WIDTH, HEIGHT)
}

#[test]
fn bundled_data_loads_completely() {
	let graph = sample();
	assert_eq!(graph.nodes().len(), 15);
	assert_eq!(graph.links().len(), 18);
	for link in graph.links() {
		assert_ne!(link.source, link.target);
	}
}

#[test]
fn unique_search_hit_opens_its_info_panel() {
	let mut s = explorer();
	s.set_query("黛玉");

	assert_eq!(s.view.nodes.len(), 1);
	assert!(s.view.links.is_empty());
	let info = s.info.as_ref().expect("single hit is selected");
	assert_eq!(info.name, "林黛玉");
	assert_eq!(info.image.as_deref(), Some("images/林黛玉.jpg"));
	let relations: Vec<_> = info
		.relations
		.iter()
		.map(|r| (r.other.as_str(), r.text.as_str()))
		.collect();
	assert_eq!(
		relations,
		vec![
			("贾宝玉", "木石前盟"),
			("贾母", "外祖母"),
			("林如海", "父女"),
			("紫鹃", "主仆"),
			("薛宝钗", "社交"),
		]
	);
}

#[test]
fn relation_filter_keeps_only_endpoints_of_matching_links() {
	let mut s = explorer();
	s.toggle_relation(RelationType::Marriage, true);

	assert_eq!(s.view.links.len(), 4);
	assert_eq!(s.view.nodes.len(), 8);
	for &l in &s.view.links {
		let link = s.graph.link(l);
		assert_eq!(link.kind, RelationType::Marriage);
		assert!(s.view.contains_node(link.source) && s.view.contains_node(link.target));
	}

	s.toggle_relation(RelationType::Kinship, true);
	assert_eq!(s.filter.relation, Some(RelationType::Kinship));
}

#[test]
fn group_filter_matches_family_as_well_as_group() {
	let mut s = explorer();
	s.set_group(Some("薛府".into()));

	let names: Vec<_> = s.view.nodes.iter().map(|&n| s.graph.node(n).id.as_str()).collect();
	assert_eq!(names, vec!["薛宝钗", "薛姨妈", "薛蟠"]);
	assert_eq!(s.view.links.len(), 2);
}

#[test]
fn reset_view_restores_everything() {
	let mut s = explorer();
	s.toggle_relation(RelationType::Social, true);
	s.set_query("宝");
	s.zoom(100.0, 100.0, -1.0);
	s.reset_view();

	assert_eq!(s.filter, FilterState::default());
	assert_eq!(s.view.nodes.len(), 15);
	assert_eq!(s.view.links.len(), 18);
	assert!(s.selection.is_idle());
	assert!(s.info.is_none());
	assert_eq!(s.transform.k, 1.0);
}

#[test]
fn layout_settles_inside_the_canvas() {
	let mut s = explorer();
	let mut frames = 0;
	while s.layout.is_running() && frames < 2000 {
		s.tick(0.016);
		frames += 1;
	}

	assert!(!s.layout.is_running());
	for idx in s.graph.node_indices() {
		let p = s.layout.position(idx).expect("visible nodes are placed");
		assert!(p.x >= 0.0 && p.x <= WIDTH as f32, "x out of bounds: {}", p.x);
		assert!(p.y >= 0.0 && p.y <= HEIGHT as f32, "y out of bounds: {}", p.y);
	}
}
