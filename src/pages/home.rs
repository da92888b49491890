use leptos::either::Either;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::force_graph::{ForceGraphCanvas, Graph, LoadError, load_graph};
use crate::config::{DATA_URL, PAGE_TEXT_URL, load_page_text};

/// The relationship graph page. Loads the graph document once, then hands it
/// (or the load error) to the explorer.
#[component]
pub fn Home() -> impl IntoView {
	let (data, set_data) = signal(None::<Result<Graph, LoadError>>);

	spawn_local(async move {
		set_data.set(Some(load_graph(DATA_URL).await));
	});
	spawn_local(load_page_text(PAGE_TEXT_URL));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"出错了"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="container-fluid">
				<header class="graph-header">
					<h1 id="title">"红楼梦人物关系图"</h1>
					<p id="subtitle" class="subtitle">
						"点击人物查看详情，拖动节点调整位置，滚轮缩放，拖动空白处平移。"
					</p>
				</header>
				{move || match data.get() {
					None => Either::Left(view! { <p class="loading">"加载中…"</p> }),
					Some(result) => Either::Right(view! { <ForceGraphCanvas data=result /> }),
				}}
			</div>
		</ErrorBoundary>
	}
}
