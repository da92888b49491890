//! DOM side of the page: filter controls, info panel, legends, tooltip.
//!
//! Reactive closures here only capture signals and owned data; handlers that
//! touch the graph state arrive through [`Actions`].

use std::rc::Rc;

use leptos::prelude::*;

use super::selection::InfoPanel;
use super::state::{ForceGraphState, Tooltip};
use super::style::{group_color, relation_color};
use super::types::{Group, RelationType};

/// Tooltip plus the page coordinates it should appear at.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipAt {
	pub tooltip: Tooltip,
	pub x: f64,
	pub y: f64,
}

/// Signals mirroring the parts of [`ForceGraphState`] the DOM shows.
#[derive(Clone, Copy)]
pub struct UiSignals {
	pub info: RwSignal<Option<InfoPanel>>,
	pub tooltip: RwSignal<Option<TooltipAt>>,
	pub relation: RwSignal<Option<RelationType>>,
	pub group: RwSignal<String>,
	pub query: RwSignal<String>,
}

impl UiSignals {
	pub fn new() -> Self {
		Self {
			info: RwSignal::new(None),
			tooltip: RwSignal::new(None),
			relation: RwSignal::new(None),
			group: RwSignal::new(String::new()),
			query: RwSignal::new(String::new()),
		}
	}

	/// Copy state into the signals, touching only what changed.
	pub fn sync(&self, s: &ForceGraphState) {
		if self.info.with_untracked(|info| *info != s.info) {
			self.info.set(s.info.clone());
		}
		if self.relation.with_untracked(|r| *r != s.filter.relation) {
			self.relation.set(s.filter.relation.clone());
		}
		let group = s.filter.group.clone().unwrap_or_default();
		if self.group.with_untracked(|g| *g != group) {
			self.group.set(group);
		}
		if self.query.with_untracked(|q| *q != s.filter.query) {
			self.query.set(s.filter.query.clone());
		}
	}

	pub fn show_tooltip(&self, s: &ForceGraphState, x: f64, y: f64) {
		let next = s.tooltip().map(|tooltip| TooltipAt {
			tooltip,
			x: x + 10.0,
			y: y - 28.0,
		});
		if self.tooltip.with_untracked(|t| *t != next) {
			self.tooltip.set(next);
		}
	}
}

impl Default for UiSignals {
	fn default() -> Self {
		Self::new()
	}
}

/// Callbacks from the DOM into the graph state.
#[derive(Clone)]
pub struct Actions {
	pub toggle_relation: Rc<dyn Fn(RelationType, bool)>,
	pub set_group: Rc<dyn Fn(String)>,
	pub search: Rc<dyn Fn(String)>,
	pub reset_view: Rc<dyn Fn()>,
	pub reset_highlight: Rc<dyn Fn()>,
	pub close_info: Rc<dyn Fn()>,
}

pub fn filter_controls(ui: UiSignals, groups: Vec<String>, actions: Actions) -> impl IntoView {
	let checkboxes = RelationType::ALL
		.into_iter()
		.map(|kind| {
			let toggle = actions.toggle_relation.clone();
			let this = kind.clone();
			let value = kind.label().to_string();
			let label = format!("{}关系", kind);
			view! {
				<label class="form-check-label me-3">
					<input
						type="checkbox"
						class="form-check-input me-1"
						value=value
						prop:checked=move || ui.relation.with(|r| r.as_ref() == Some(&this))
						on:change=move |ev| toggle(kind.clone(), event_target_checked(&ev))
					/>
					{label}
				</label>
			}
		})
		.collect_view();

	let options = groups
		.into_iter()
		.map(|g| {
			let value = g.clone();
			view! { <option value=value>{g}</option> }
		})
		.collect_view();

	let Actions {
		set_group,
		search,
		reset_view,
		..
	} = actions;

	view! {
		<div class="controls">
			<div class="relation-filters">{checkboxes}</div>
			<select
				id="group-filter"
				class="form-select"
				prop:value=move || ui.group.get()
				on:change=move |ev| set_group(event_target_value(&ev))
			>
				<option value="">"全部人物"</option>
				{options}
			</select>
			<input
				id="search"
				type="search"
				class="form-control"
				placeholder="搜索人物…"
				prop:value=move || ui.query.get()
				on:input=move |ev| search(event_target_value(&ev))
			/>
			<button id="reset-view" class="btn btn-outline-secondary" on:click=move |_| reset_view()>
				"重置视图"
			</button>
		</div>
	}
}

pub fn info_panel(ui: UiSignals, actions: Actions) -> impl IntoView {
	let (close, reset_highlight) = (actions.close_info, actions.reset_highlight);

	let details = move || {
		ui.info.get().map(|panel: InfoPanel| {
			let image = match panel.image {
				Some(path) => view! {
					<div
						class="character-image"
						style:background-image=format!("url('{}')", path)
					></div>
				}
				.into_any(),
				None => view! { <div class="character-image">"暂无图片"</div> }.into_any(),
			};
			let relations = panel
				.relations
				.into_iter()
				.map(|r| view! { <li><strong>{r.other}</strong>": "{r.text}</li> })
				.collect_view();
			view! {
				<h3 class="character-name">{panel.name}</h3>
				{image}
				<p class="character-description">
					{panel.description.unwrap_or_else(|| "暂无描述".to_string())}
				</p>
				<ul class="character-relations">{relations}</ul>
			}
		})
	};

	view! {
		<div
			id="info-panel"
			class="info-panel"
			style:display=move || if ui.info.with(Option::is_some) { "block" } else { "none" }
		>
			<button id="close-info" class="btn-close" on:click=move |_| close()>"×"</button>
			{details}
			<button id="reset-highlight" class="btn btn-sm btn-outline-primary" on:click=move |_| reset_highlight()>
				"重置高亮"
			</button>
		</div>
	}
}

pub fn legend() -> impl IntoView {
	let groups = Group::DISPLAY_ORDER
		.iter()
		.map(|g| {
			let (color, label) = (group_color(g), g.label().to_string());
			view! {
				<div class="legend-item me-4 mb-2">
					<span class="color-box me-2" style:background-color=color></span>
					<span>{label}</span>
				</div>
			}
		})
		.collect_view();

	let relations = RelationType::ALL
		.iter()
		.map(|kind| {
			let (color, label) = (relation_color(kind), format!("{}关系", kind));
			view! {
				<div class="legend-item me-4 mb-2">
					<span class="color-box me-2" style:background-color=color></span>
					<span>{label}</span>
				</div>
			}
		})
		.collect_view();

	view! {
		<div id="group-legend" class="legend">{groups}</div>
		<div id="relation-legend" class="legend">{relations}</div>
	}
}

pub fn tooltip(ui: UiSignals) -> impl IntoView {
	let content = move || {
		ui.tooltip.get().map(|at| {
			let lines = at
				.tooltip
				.lines
				.into_iter()
				.map(|line| view! { <br/>{line} })
				.collect_view();
			view! { <strong>{at.tooltip.title}</strong>{lines} }
		})
	};

	view! {
		<div
			class="tooltip"
			style:opacity=move || if ui.tooltip.with(Option::is_some) { "0.9" } else { "0" }
			style:left=move || ui.tooltip.with(|t| t.as_ref().map(|t| format!("{}px", t.x)).unwrap_or_default())
			style:top=move || ui.tooltip.with(|t| t.as_ref().map(|t| format!("{}px", t.y)).unwrap_or_default())
		>
			{content}
		</div>
	}
}
