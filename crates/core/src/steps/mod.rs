//! Built-in close steps.
//!
//! Each step module exposes its registered `NAME` and a `build` factory.

pub mod engagement_letter;
pub mod fx_translator;
pub mod pdf_assembler;
pub mod tb_collector;

pub use engagement_letter::ClientEngagementLetterDraft;
pub use fx_translator::FxTranslator;
pub use pdf_assembler::PdfAssembler;
pub use tb_collector::TbCollector;
