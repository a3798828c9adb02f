//! Infrastructure stacks for a self-hosted deployment service
//!
//! Two independent units, each declaring its desired resources and
//! publishing outputs for downstream layers:
//!
//! - [`DatabaseStack`]: a managed MySQL server with a generated admin
//!   credential, a server parameter override, a subnet binding, and the
//!   `pulumi` database the deployment service expects.
//! - [`StorageStack`]: a storage account holding the checkpoint and
//!   policy-pack containers, with its access keys read after creation.
//!
//! The units share no resources; both consume an externally provisioned
//! resource group, and the database unit additionally consumes a subnet.

pub mod database;
pub mod storage;

pub use database::{DatabaseArgs, DatabaseStack};
pub use storage::{StorageArgs, StorageStack};
