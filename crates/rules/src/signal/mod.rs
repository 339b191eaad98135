//! Signal templates: declarative alert rules attached to queues, the drafts
//! they are edited through, and the step-by-step builder.

mod builder;
mod draft;
mod template;


pub use builder::*;
pub use draft::*;
pub use template::*;

pub(crate) fn default_true() -> bool {
    true
}
