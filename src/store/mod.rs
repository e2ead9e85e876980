pub mod suggestions;

pub use suggestions::SuggestionStore;
