//! Visual encoding: colors by category, sizes by role, emphasis by selection.

use super::selection::{LinkEmphasis, NodeEmphasis};
use super::types::{Group, RelationType};

pub const DEFAULT_LINK_COLOR: &str = "#999999";
pub const LINK_OPACITY: f64 = 0.6;
pub const DIMMED_LINK_OPACITY: f64 = 0.1;
pub const DIMMED_NODE_OPACITY: f64 = 0.15;
pub const DIMMED_LABEL_OPACITY: f64 = 0.3;
/// Extra distance around a node's circle that still counts as a hit.
pub const HIT_PADDING: f64 = 4.0;

pub fn group_color(group: &Group) -> &'static str {
	match group {
		Group::Protagonist => "#E63946",
		Group::TwelveBeauties => "#9D4EDD",
		Group::TwelveBeautiesSecondary => "#C77DFF",
		Group::JiaHousehold => "#457B9D",
		Group::LinHousehold => "#1D3557",
		Group::XueHousehold => "#F1C453",
		Group::Minor | Group::Other(_) => "#A8DADC",
	}
}

pub fn relation_color(kind: &RelationType) -> &'static str {
	match kind {
		RelationType::Kinship => "#f7b55c",
		RelationType::Marriage => "#de2f44",
		RelationType::Social => "#1154b2",
		RelationType::MasterServant => "#98d606",
		RelationType::Special => "#d900ff",
		RelationType::Other(_) => DEFAULT_LINK_COLOR,
	}
}

/// An sRGB color with alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Rgba {
	pub const WHITE: Rgba = Rgba {
		r: 255,
		g: 255,
		b: 255,
		a: 1.0,
	};

	/// Parse `#rrggbb`. Anything else is mid grey.
	pub fn from_hex(hex: &str) -> Self {
		let channel = |i: usize| {
			hex.get(i..i + 2)
				.and_then(|h| u8::from_str_radix(h, 16).ok())
		};
		match (hex.len(), channel(1), channel(3), channel(5)) {
			(7, Some(r), Some(g), Some(b)) if hex.starts_with('#') => Rgba { r, g, b, a: 1.0 },
			_ => Rgba {
				r: 153,
				g: 153,
				b: 153,
				a: 1.0,
			},
		}
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Rgba { a, ..self }
	}

	/// Keep `amount` of the original saturation (1 = unchanged, 0 = grey).
	pub fn saturate(self, amount: f64) -> Self {
		let luma = 0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64;
		let mix = |c: u8| (luma + (c as f64 - luma) * amount).round().clamp(0.0, 255.0) as u8;
		Rgba {
			r: mix(self.r),
			g: mix(self.g),
			b: mix(self.b),
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	pub radius: f64,
	pub fill: Rgba,
	pub stroke: Rgba,
	pub stroke_width: f64,
	pub font_size: f64,
	/// Distance from the node center down to the label baseline.
	pub label_offset: f64,
	pub label_color: Rgba,
}

impl NodeStyle {
	pub fn new(group: &Group, emphasis: NodeEmphasis) -> Self {
		let minor = group.is_minor();
		let mut style = NodeStyle {
			radius: if minor { 7.0 } else { 10.0 },
			fill: Rgba::from_hex(group_color(group)),
			stroke: Rgba::WHITE,
			stroke_width: if minor { 1.0 } else { 2.0 },
			font_size: if minor { 8.0 } else { 10.0 },
			label_offset: if minor { 15.0 } else { 20.0 },
			label_color: Rgba::from_hex("#333333"),
		};
		match emphasis {
			NodeEmphasis::Normal | NodeEmphasis::Neighbor => {}
			NodeEmphasis::Selected => {
				style.radius = if minor { 12.0 } else { 15.0 };
				style.stroke_width = 3.0;
			}
			NodeEmphasis::Dimmed => {
				style.fill = style.fill.saturate(0.3).with_alpha(DIMMED_NODE_OPACITY);
				style.stroke = style.stroke.with_alpha(DIMMED_NODE_OPACITY);
				style.label_color = style.label_color.with_alpha(DIMMED_LABEL_OPACITY);
			}
		}
		style
	}

	/// Radius used for pointer hit testing.
	pub fn hit_radius(&self) -> f64 {
		self.radius + HIT_PADDING
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkStyle {
	pub color: Rgba,
	pub width: f64,
}

impl LinkStyle {
	pub fn new(kind: &RelationType, value: f64, emphasis: LinkEmphasis) -> Self {
		let base = Rgba::from_hex(relation_color(kind));
		let color = match emphasis {
			LinkEmphasis::Normal => base.with_alpha(LINK_OPACITY),
			LinkEmphasis::Highlighted => base,
			LinkEmphasis::Dimmed => base.saturate(0.0).with_alpha(DIMMED_LINK_OPACITY),
		};
		LinkStyle {
			color,
			width: value.max(0.0).sqrt(),
		}
	}
}
