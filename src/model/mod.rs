mod dag;
mod progress;
mod vertex;

pub use dag::*;
pub use progress::*;
pub use vertex::*;
