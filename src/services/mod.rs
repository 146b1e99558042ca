pub mod figure_extractor;
pub mod figure_patcher;
pub mod llm_service;
pub mod outline_service;
pub mod retry;

pub use figure_extractor::FigureExtractor;
pub use figure_patcher::{apply_figures, PatchReport};
pub use llm_service::{LlmClient, LlmService, StageClients};
pub use outline_service::OutlineService;
pub use retry::retry_recoverable;
