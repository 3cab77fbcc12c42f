/// Device module - the render-thread command queue and everything it drives

// Module declarations
pub mod exec;
pub mod queries;
pub mod reclaim;
pub mod info;
pub mod device;
pub mod rtt;

// Re-export from other modules
pub use exec::*;
pub use queries::*;
pub use reclaim::*;
pub use info::*;
pub use device::*;
pub use rtt::*;
