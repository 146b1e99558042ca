pub mod figure;
pub mod loaders;
pub mod outline;
pub mod survey;

pub use figure::{Figure, FigureKind, FigureMap};
pub use loaders::{load_survey, save_survey};
pub use outline::{Evaluation, Outline, OutlineSection, RenderOptions};
pub use survey::{Paper, Section, Survey};
