pub mod check;
pub mod init;
pub mod parse;
pub mod serialize;
pub mod sync;

pub use check::{check, CheckArgs};
pub use init::{init, InitArgs};
pub use parse::{parse, ParseArgs};
pub use serialize::{serialize, SerializeArgs};
pub use sync::{sync, SyncArgs};
