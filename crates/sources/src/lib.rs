//! Azure resource key sources for keyfan
//!
//! One `keyfan_core::KeySource` implementation per resource kind, all backed
//! by a shared [`ArmClient`] that issues the management-plane "list keys"
//! calls:
//!
//! - [`FunctionKeySource`] - function app host master keys
//! - [`CosmosKeySource`] - Cosmos DB account keys
//! - [`EventGridKeySource`] - Event Grid domain shared access keys
//! - [`IntegrationRuntimeKeySource`] - Data Factory integration runtime auth keys
//! - [`StorageKeySource`] - storage account access keys

mod arm;
mod cosmos;
mod datafactory;
mod eventgrid;
mod storage;
mod webapp;

pub use arm::ArmClient;
pub use cosmos::CosmosKeySource;
pub use datafactory::IntegrationRuntimeKeySource;
pub use eventgrid::EventGridKeySource;
pub use storage::StorageKeySource;
pub use webapp::FunctionKeySource;
