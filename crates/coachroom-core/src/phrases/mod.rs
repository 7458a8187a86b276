mod pool;
mod selector;
mod template;

pub use pool::{MemoryPool, PhraseEventType, PhraseItem, PhraseQuery, PhraseStore};
pub use selector::ResponseSelector;
pub use template::{render, RenderArgs};
