pub mod commands;
pub mod format;
pub mod router;
pub mod runtime;
pub mod talker;
