//! The tools the concierge model can use.

mod weather;
mod web_search;
mod winery_info;

pub use weather::WeatherTool;
pub use web_search::WebSearchTool;
pub use winery_info::{KeywordRetriever, Passage, Retriever, WineryInfoTool};
