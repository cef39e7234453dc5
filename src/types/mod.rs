// ABOUTME: Type-safe identifiers and validated chain value types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod hex;
mod id;
mod resource_name;

pub use hex::{Address, HexValueError, TxHash};
pub use id::{BlueprintId, CallId, Id, RequestId, ServiceId};
pub use resource_name::{ResourceName, ResourceNameError};
