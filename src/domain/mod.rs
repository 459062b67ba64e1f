pub mod book;
pub mod caller;
pub mod order;
pub mod page;
pub mod payment;
pub mod stats;
pub mod user;

pub use book::*;
pub use caller::*;
pub use order::*;
pub use page::*;
pub use payment::*;
pub use stats::*;
pub use user::*;
