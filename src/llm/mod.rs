pub mod r#trait;
pub mod chat;

pub use chat::ChatCompletionProvider;
pub use r#trait::CompletionProvider;
