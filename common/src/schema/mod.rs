mod payment;
mod teacher;
mod transaction;
mod users;

pub use payment::*;
pub use teacher::*;
pub use transaction::*;
pub use users::*;
