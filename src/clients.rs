pub mod gemini;
pub mod translator;

pub use gemini::{GeminiClient, GeminiConfig};
pub use translator::{
    GoogleTranslator, PivotText, TranslationError, Translator, TranslatorConfig,
};
