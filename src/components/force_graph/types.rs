//! Graph document types as they appear in the JSON data file.

use std::fmt;

use serde::Deserialize;

/// Character category. Known labels get their own variant so styling and
/// legends can match on them; anything else is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Group {
	/// 主角
	Protagonist,
	/// 金陵十二钗正册
	TwelveBeauties,
	/// 金陵十二钗副册
	TwelveBeautiesSecondary,
	/// 贾府
	JiaHousehold,
	/// 林府
	LinHousehold,
	/// 薛府
	XueHousehold,
	/// 次要角色
	Minor,
	/// Any label not in the table above.
	Other(String),
}

impl Group {
	/// Legend order.
	pub const DISPLAY_ORDER: [Group; 7] = [
		Group::Protagonist,
		Group::TwelveBeauties,
		Group::TwelveBeautiesSecondary,
		Group::JiaHousehold,
		Group::LinHousehold,
		Group::XueHousehold,
		Group::Minor,
	];

	/// The label used in the data file.
	pub fn label(&self) -> &str {
		match self {
			Group::Protagonist => "主角",
			Group::TwelveBeauties => "金陵十二钗正册",
			Group::TwelveBeautiesSecondary => "金陵十二钗副册",
			Group::JiaHousehold => "贾府",
			Group::LinHousehold => "林府",
			Group::XueHousehold => "薛府",
			Group::Minor => "次要角色",
			Group::Other(label) => label,
		}
	}

	/// Minor roles are drawn smaller and pulled back toward the center.
	pub fn is_minor(&self) -> bool {
		matches!(self, Group::Minor)
	}
}

impl From<String> for Group {
	fn from(label: String) -> Self {
		match label.as_str() {
			"主角" => Group::Protagonist,
			"金陵十二钗正册" => Group::TwelveBeauties,
			"金陵十二钗副册" => Group::TwelveBeautiesSecondary,
			"贾府" => Group::JiaHousehold,
			"林府" => Group::LinHousehold,
			"薛府" => Group::XueHousehold,
			"次要角色" => Group::Minor,
			_ => Group::Other(label),
		}
	}
}

impl fmt::Display for Group {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Category of a relationship.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum RelationType {
	/// 亲属
	Kinship,
	/// 婚姻
	Marriage,
	/// 社交
	Social,
	/// 主仆
	MasterServant,
	/// 特殊
	Special,
	/// Any label not in the table above.
	Other(String),
}

impl RelationType {
	/// Legend and checkbox order.
	pub const ALL: [RelationType; 5] = [
		RelationType::Kinship,
		RelationType::Marriage,
		RelationType::Social,
		RelationType::MasterServant,
		RelationType::Special,
	];

	/// The label used in the data file.
	pub fn label(&self) -> &str {
		match self {
			RelationType::Kinship => "亲属",
			RelationType::Marriage => "婚姻",
			RelationType::Social => "社交",
			RelationType::MasterServant => "主仆",
			RelationType::Special => "特殊",
			RelationType::Other(label) => label,
		}
	}
}

impl From<String> for RelationType {
	fn from(label: String) -> Self {
		match label.as_str() {
			"亲属" => RelationType::Kinship,
			"婚姻" => RelationType::Marriage,
			"社交" => RelationType::Social,
			"主仆" => RelationType::MasterServant,
			"特殊" => RelationType::Special,
			_ => RelationType::Other(label),
		}
	}
}

impl fmt::Display for RelationType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// A character.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphNode {
	/// Unique name, also the display label.
	pub id: String,
	/// Category used for color, size and the group filter.
	pub group: Group,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub image: Option<String>,
	#[serde(default)]
	pub family: Option<String>,
}

/// A link endpoint before normalization: a node id, or a position in the
/// `nodes` array.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
	/// Reference by node id.
	Id(String),
	/// Reference by index into `nodes`.
	Index(usize),
}

fn default_value() -> f64 {
	1.0
}

/// A relationship as it appears in the document.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphLink {
	pub source: Endpoint,
	pub target: Endpoint,
	#[serde(rename = "type")]
	pub kind: RelationType,
	/// Weight; drives stroke width and info panel ordering.
	#[serde(default = "default_value")]
	pub value: f64,
	#[serde(default)]
	pub description: Option<String>,
}

/// Raw graph document. Both arrays are optional here so a missing one can be
/// reported by name instead of as a generic parse error.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphDocument {
	pub nodes: Option<Vec<GraphNode>>,
	pub links: Option<Vec<GraphLink>>,
}
