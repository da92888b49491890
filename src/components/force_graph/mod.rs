mod component;
mod error;
mod filter;
mod graph;
mod layout;
mod loader;
mod panel;
mod render;
mod scene;
mod selection;
mod state;
mod style;
mod types;

pub use component::ForceGraphCanvas;
pub use error::LoadError;
pub use filter::FilterState;
pub use graph::Graph;
pub use loader::{fetch_text, load_graph, parse_graph};
pub use state::ForceGraphState;
pub use types::RelationType;
