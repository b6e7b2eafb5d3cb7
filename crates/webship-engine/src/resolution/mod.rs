pub mod association;
pub mod descriptor;
pub mod engine;
pub mod index;
pub mod result;

pub use association::{find_by_label_text, normalize_label_text};
pub use descriptor::Descriptor;
pub use engine::{ResolutionEngine, Strategy};
pub use index::{Candidate, ElementIndex, ElementTag, Label};
pub use result::{Resolution, ResolutionError, Unresolved};
