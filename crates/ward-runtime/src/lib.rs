mod chdir;
mod hub;
mod registry;

pub use chdir::ChdirLock;
pub use hub::Hub;
pub use registry::AgentRegistry;
