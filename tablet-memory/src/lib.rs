mod executor;
mod table;

pub use executor::*;
pub use table::*;
