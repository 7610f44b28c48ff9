mod connector;
mod pump;
mod ticker;

pub use connector::*;
pub use pump::*;
pub use ticker::*;
