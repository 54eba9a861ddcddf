mod as_value;
mod entity;
mod error;
mod executor;
mod template;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use template::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
