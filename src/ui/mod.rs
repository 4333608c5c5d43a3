pub mod terminal;

pub use terminal::{render_bar, render_public_results, render_vote_page};
