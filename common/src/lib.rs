mod export;
mod fixtures;
mod helpers;
mod schema;

pub mod gateway;
pub mod validation;
pub mod wizard;

pub use export::*;
pub use fixtures::*;
pub use helpers::*;
pub use schema::*;
