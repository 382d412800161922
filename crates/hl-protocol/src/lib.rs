pub mod codec;
pub mod command;
pub mod master;
pub mod slave;

pub use codec::{LogLevel, MasterOut, SlaveFrame, SlaveOut};
pub use command::Command;
pub use master::MasterConnection;
pub use slave::{stdio_slave, SlaveReader, SlaveSender};
