mod renderer;

pub use renderer::{HtmlListingRenderer, ListingRenderer, WaitPolicy};
