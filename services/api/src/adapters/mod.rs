pub mod chat_llm;
pub mod ocr;
pub mod pdf;

pub use chat_llm::{single_attempt_client, OpenAiChatAdapter};
pub use ocr::TesseractAdapter;
pub use pdf::LopdfAdapter;
