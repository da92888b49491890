use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use leptos::leptos_dom::helpers::{TimeoutHandle, set_timeout_with_handle};
use leptos::prelude::*;
use log::{debug, error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::error::LoadError;
use super::filter::group_options;
use super::graph::Graph;
use super::panel::{self, Actions, UiSignals};
use super::render::{self, CanvasScene};
use super::scene::Scene;
use super::state::{ForceGraphState, Hover};
use super::types::{Group, RelationType};
use crate::config::RESIZE_DEBOUNCE_MS;

type SharedState = Rc<RefCell<Option<ForceGraphState>>>;

/// Longest frame step fed to the layout, in seconds.
const MAX_FRAME_DT: f32 = 0.05;

/// Run `f` against the live state, then mirror it into the DOM signals.
fn update_state(state: &SharedState, ui: UiSignals, f: impl FnOnce(&mut ForceGraphState)) {
	if let Some(ref mut s) = *state.borrow_mut() {
		f(s);
		ui.sync(s);
	}
}

fn container_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn set_cursor(canvas_ref: NodeRef<leptos::html::Canvas>, s: &ForceGraphState) {
	let cursor = if s.drag.node.is_some() || s.pan.active {
		"grabbing"
	} else if matches!(s.hover, Hover::Node(_)) {
		"pointer"
	} else {
		"grab"
	};
	if let Some(canvas) = canvas_ref.get_untracked() {
		let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
	}
}

/// The explorer: canvas, controls, info panel, legends and tooltip.
///
/// A failed load still mounts the page and draws the error in the canvas.
#[component]
pub fn ForceGraphCanvas(data: Result<Graph, LoadError>) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let ui = UiSignals::new();

	let groups = match &data {
		Ok(graph) => group_options(graph),
		Err(_) => Group::DISPLAY_ORDER.iter().map(|g| g.label().to_string()).collect(),
	};

	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = container_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("Canvas 2d context unavailable");
			return;
		};

		let graph = match &data {
			Ok(graph) => graph.clone(),
			Err(e) => {
				CanvasScene::new(&ctx).draw_message(w, h, &format!("数据加载失败: {}", e));
				return;
			}
		};
		let s = ForceGraphState::new(graph, w, h);
		ui.sync(&s);
		*state_init.borrow_mut() = Some(s);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		let pending: Rc<Cell<Option<TimeoutHandle>>> = Rc::new(Cell::new(None));
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(handle) = pending.take() {
				handle.clear();
			}
			let (state_resize, canvas_resize) = (state_resize.clone(), canvas_resize.clone());
			let settled = move || {
				let (nw, nh) = container_size(&canvas_resize);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					debug!("Resized to {}x{}", nw, nh);
					s.resize(nw, nh);
				}
			};
			match set_timeout_with_handle(settled, Duration::from_millis(RESIZE_DEBOUNCE_MS)) {
				Ok(handle) => pending.set(Some(handle)),
				Err(e) => warn!("Could not schedule resize: {:?}", e),
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		let mut last = js_sys::Date::now();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now = js_sys::Date::now();
			let dt = (((now - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT);
			last = now;
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.layout.is_running() {
					s.tick(dt);
				}
				render::render(s, &mut CanvasScene::new(&ctx));
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		update_state(&state_md, ui, |s| {
			s.pointer_down(x, y);
			set_cursor(canvas_ref, s);
		});
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		update_state(&state_mm, ui, |s| {
			s.pointer_move(x, y);
			ui.show_tooltip(s, ev.page_x() as f64, ev.page_y() as f64);
			set_cursor(canvas_ref, s);
		});
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		update_state(&state_mu, ui, |s| {
			s.pointer_up();
			set_cursor(canvas_ref, s);
		});
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		update_state(&state_ml, ui, |s| {
			s.pointer_leave();
			ui.show_tooltip(s, 0.0, 0.0);
			set_cursor(canvas_ref, s);
		});
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		update_state(&state_wh, ui, |s| s.zoom(x, y, ev.delta_y()));
	};

	let actions = Actions {
		toggle_relation: {
			let state = state.clone();
			Rc::new(move |kind: RelationType, checked: bool| {
				update_state(&state, ui, |s| s.toggle_relation(kind, checked))
			})
		},
		set_group: {
			let state = state.clone();
			Rc::new(move |group: String| update_state(&state, ui, |s| s.set_group(Some(group))))
		},
		search: {
			let state = state.clone();
			Rc::new(move |query: String| update_state(&state, ui, |s| s.set_query(&query)))
		},
		reset_view: {
			let state = state.clone();
			Rc::new(move || update_state(&state, ui, ForceGraphState::reset_view))
		},
		reset_highlight: {
			let state = state.clone();
			Rc::new(move || update_state(&state, ui, ForceGraphState::reset_highlight))
		},
		close_info: {
			let state = state.clone();
			Rc::new(move || update_state(&state, ui, ForceGraphState::clear_selection))
		},
	};

	view! {
		{panel::filter_controls(ui, groups, actions.clone())}
		<div class="graph-area">
			<div id="graph-container" class="graph-container">
				<canvas
					node_ref=canvas_ref
					class="force-graph-canvas"
					on:mousedown=on_mousedown
					on:mousemove=on_mousemove
					on:mouseup=on_mouseup
					on:mouseleave=on_mouseleave
					on:wheel=on_wheel
					style="display: block; cursor: grab;"
				/>
			</div>
			{panel::info_panel(ui, actions)}
		</div>
		{panel::legend()}
		{panel::tooltip(ui)}
	}
}
