pub mod config_io;
pub mod logging;
pub mod paths;
pub mod recovery;
pub mod tab_io;
