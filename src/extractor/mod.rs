pub mod r#trait;
pub mod pdf;

pub use pdf::PdfExtractor;
pub use r#trait::TextExtractor;
