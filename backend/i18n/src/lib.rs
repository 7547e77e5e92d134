pub mod defaults;
pub mod dictionary;
pub mod loader;
pub mod prompts;

pub use dictionary::Dictionary;
pub use loader::{DictionarySource, CACHE_KEY};
pub use prompts::{prompt_text, PromptKind};
