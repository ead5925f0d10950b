//! Laundry operations engine
//!
//! Backend core for a multi-branch laundry business: satellite branches
//! take orders in, ship them to the main store in transfer batches, the
//! main store processes them through workstation stages, and the finished
//! order goes back out by collection or delivery.
//!
//! # Module structure
//!
//! ```text
//! ops-core/src/
//! ├── core/       # Configuration
//! ├── drivers/    # Driver roster
//! ├── lifecycle/  # Order documents, commands, manager, store
//! ├── transfers/  # Satellite -> main store batch workflow
//! ├── payments/   # Counter payments, gateway polling, store credit
//! ├── pipeline/   # Dashboard aggregation over the active order set
//! └── utils/      # Logging
//! ```

pub mod core;
pub mod drivers;
pub mod lifecycle;
pub mod payments;
pub mod pipeline;
pub mod transfers;
pub mod utils;

pub use crate::core::Config;
pub use drivers::DriverRoster;
pub use lifecycle::{ManagerError, OrderLifecycleManager, OrderStore};
pub use payments::{
    CreditLedger, InMemoryCreditLedger, PaymentGateway, PaymentService, PollSchedule,
    SettlementOutcome,
};
pub use pipeline::{compute_pipeline_stats, PipelineMonitor, PipelineStats};
pub use transfers::{TransferError, TransferManager};
pub use utils::{init_logger, init_logger_with_file};
