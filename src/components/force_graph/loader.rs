//! Fetches the graph document and turns it into a [`Graph`].

use log::{error, info};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use super::error::LoadError;
use super::graph::Graph;
use super::types::GraphDocument;

/// Parse and normalize a graph document.
pub fn parse_graph(json: &str) -> Result<Graph, LoadError> {
	let doc: GraphDocument = serde_json::from_str(json)?;
	Graph::from_document(doc)
}

/// GET `url` and return the body as text.
pub async fn fetch_text(url: &str) -> Result<String, LoadError> {
	let opts = RequestInit::new();
	opts.set_method("GET");

	let request = Request::new_with_str_and_init(url, &opts)
		.map_err(|e| LoadError::Fetch(format!("{:?}", e)))?;
	let window = web_sys::window().ok_or_else(|| LoadError::Fetch("no window".into()))?;
	let resp_value = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(|e| LoadError::Fetch(format!("{:?}", e)))?;
	let resp: Response = resp_value
		.dyn_into()
		.map_err(|_| LoadError::Fetch("response is not a Response".into()))?;

	if !resp.ok() {
		return Err(LoadError::Http(resp.status()));
	}

	let text = JsFuture::from(resp.text().map_err(|e| LoadError::Fetch(format!("{:?}", e)))?)
		.await
		.map_err(|e| LoadError::Fetch(format!("{:?}", e)))?;
	text.as_string()
		.ok_or_else(|| LoadError::Parse("response body is not text".into()))
}

/// Load the graph once. Failures are logged here and returned for display.
pub async fn load_graph(url: &str) -> Result<Graph, LoadError> {
	let result = match fetch_text(url).await {
		Ok(body) => parse_graph(&body),
		Err(e) => Err(e),
	};
	match &result {
		Ok(graph) => info!(
			"Loaded {} nodes and {} links from {}",
			graph.nodes().len(),
			graph.links().len(),
			url
		),
		Err(e) => error!("Failed to load graph data from {}: {}", url, e),
	}
	result
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{Group, RelationType};

	#[test]
	fn parses_a_full_document() {
		let json = r#"{
			"nodes": [
				{"id": "贾宝玉", "group": "主角", "description": "衔玉而生", "image": "baoyuImg.jpg"},
				{"id": "林黛玉", "group": "金陵十二钗正册", "family": "林府"},
				{"id": "焦大", "group": "仆人"}
			],
			"links": [
				{"source": "贾宝玉", "target": "林黛玉", "type": "特殊", "value": 10, "description": "木石前盟"},
				{"source": "焦大", "target": "贾宝玉", "type": "主仆"}
			]
		}"#;
		let graph = parse_graph(json).unwrap();

		assert_eq!(graph.nodes().len(), 3);
		assert_eq!(graph.nodes()[1].family.as_deref(), Some("林府"));
		assert_eq!(graph.nodes()[2].group, Group::Other("仆人".into()));
		assert_eq!(graph.links()[0].kind, RelationType::Special);
		assert_eq!(graph.links()[0].value, 10.0);
		assert_eq!(graph.links()[1].value, 1.0);
		assert_eq!(graph.links()[1].description, None);
	}

	#[test]
	fn missing_arrays_are_named() {
		assert_eq!(
			parse_graph(r#"{"links": []}"#).unwrap_err(),
			LoadError::MissingField("nodes")
		);
		assert_eq!(
			parse_graph(r#"{"nodes": []}"#).unwrap_err(),
			LoadError::MissingField("links")
		);
	}

	#[test]
	fn malformed_json_is_a_parse_error() {
		assert!(matches!(parse_graph("{nodes: ["), Err(LoadError::Parse(_))));
		assert!(matches!(
			parse_graph(r#"{"nodes": [{"group": "主角"}], "links": []}"#),
			Err(LoadError::Parse(_))
		));
	}

	#[test]
	fn error_messages_are_readable() {
		assert_eq!(LoadError::Http(404).to_string(), "HTTP error: 404");
		assert_eq!(
			LoadError::MissingField("links").to_string(),
			"graph document is missing `links`"
		);
	}
}
