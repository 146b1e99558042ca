pub mod candidate_flow;
pub mod figure_flow;
pub mod refine_ctx;

pub use candidate_flow::{CandidateFlow, CandidateInput};
pub use figure_flow::FigureFlow;
pub use refine_ctx::RefineCtx;
