pub mod payment;
pub mod response;
pub mod webhook;

pub use payment::*;
pub use response::*;
pub use webhook::*;
