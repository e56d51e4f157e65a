pub mod copier;
pub mod resolver;
pub mod sync;
pub mod ytmusic;
