//! Asset locations, timing constants and the page-text loader.

use std::collections::BTreeMap;

use log::{info, warn};

use crate::components::force_graph::{LoadError, fetch_text};

/// Graph document, relative to the page.
pub const DATA_URL: &str = "data/hongloumeng.json";
/// Element id to text content map for the page copy.
pub const PAGE_TEXT_URL: &str = "./index.json";
/// Quiet period before a window resize is applied.
pub const RESIZE_DEBOUNCE_MS: u64 = 250;

/// Page copy keyed by element id.
pub type PageText = BTreeMap<String, String>;

/// Parse the page-text document.
pub fn parse_page_text(json: &str) -> Result<PageText, LoadError> {
	Ok(serde_json::from_str(json)?)
}

/// Replace the text of every element named in `text`. Returns the ids that
/// had no matching element.
pub fn apply_page_text(text: &PageText) -> Vec<String> {
	let Some(document) = web_sys::window().and_then(|w| w.document()) else {
		warn!("No document to apply page text to");
		return text.keys().cloned().collect();
	};
	let mut missing = Vec::new();
	for (id, value) in text {
		match document.get_element_by_id(id) {
			Some(el) => el.set_text_content(Some(value)),
			None => {
				warn!("No element with id `{}` for page text", id);
				missing.push(id.clone());
			}
		}
	}
	missing
}

/// Fetch and apply the page copy. Failures only log.
pub async fn load_page_text(url: &str) {
	match fetch_text(url).await.and_then(|body| parse_page_text(&body)) {
		Ok(text) => {
			let missing = apply_page_text(&text);
			info!(
				"Applied {} page text entries from {}",
				text.len() - missing.len(),
				url
			);
		}
		Err(e) => warn!("Failed to load page text from {}: {}", url, e),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn page_text_is_an_id_to_text_map() {
		let text = parse_page_text(r#"{"title": "红楼梦人物关系图", "subtitle": "点击人物查看详情"}"#)
			.unwrap();
		assert_eq!(text.len(), 2);
		assert_eq!(text["title"], "红楼梦人物关系图");
	}

	#[test]
	fn page_text_values_must_be_strings() {
		assert!(matches!(
			parse_page_text(r#"{"title": 3}"#),
			Err(LoadError::Parse(_))
		));
		assert!(matches!(parse_page_text("[]"), Err(LoadError::Parse(_))));
	}
}
