pub mod capi;
pub mod debug;
