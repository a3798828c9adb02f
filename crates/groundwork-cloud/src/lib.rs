//! Groundwork Cloud Provisioning Engine
//!
//! This crate provides the provider-agnostic core of Groundwork: desired
//! state is declared as a set of resource descriptors with parent/child and
//! explicit dependencies, a plan is computed against observed remote state,
//! and the plan is applied in dependency order.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 Groundwork CLI                   │
//! │            (groundwork up/destroy)               │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               groundwork-cloud                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          Provider Abstraction             │   │
//! │  │  trait CloudProvider { ... }              │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │  Dep. Graph  │  │   Outputs    │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────────────────────┬─────────────────────────┘
//!                         │
//!                 ┌───────▼───────┐
//!                 │     azure     │
//!                 │   provider    │
//!                 └───────────────┘
//! ```
//!
//! Two invariants are enforced here rather than in providers:
//!
//! - a child resource is never submitted before its parent, and explicit
//!   dependencies are honored ([`graph`]);
//! - a resource marked protected is never deleted or replaced without an
//!   explicit force override ([`action::destroy_plan`]).

pub mod action;
pub mod error;
pub mod graph;
pub mod output;
pub mod password;
pub mod provider;
pub mod resource;
pub mod secret;
pub mod state;

// Re-exports
pub use action::{Action, ActionType, ApplyResult, Plan, PlanSummary, destroy_plan};
pub use error::{CloudError, Result};
pub use graph::{creation_order, destroy_order};
pub use output::{OutputValue, StackOutputs};
pub use password::PasswordPolicy;
pub use provider::{AuthStatus, CloudProvider};
pub use resource::{ResourceConfig, ResourceSet};
pub use secret::SecretString;
pub use state::{ProviderState, ResourceState, ResourceStatus};
