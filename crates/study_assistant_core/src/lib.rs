pub mod domain;
pub mod extraction;
pub mod flashcards;
pub mod ports;
pub mod prompts;
pub mod retry;
pub mod study;
pub mod tutor;

pub use domain::{
    ChatHistory, ConversationTurn, ExtractedText, Flashcard, FlashcardParse, ImageKind, MediaType,
    Role, StudyAction, StudyOutput, UploadedDocument,
};
pub use extraction::DocumentExtractor;
pub use ports::{
    CompletionService, OcrService, PdfTextService, PortError, PortResult, TextExtractionService,
};
pub use prompts::PromptBuilder;
pub use retry::{RetryPolicy, RetryingCompletion};
pub use study::StudyAssistant;
pub use tutor::TutorSession;
