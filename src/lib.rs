pub use tablet_core::*;
