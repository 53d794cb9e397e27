//! `administrare_report`:
//! inventory spreadsheet reports built on `administrare_io_xlsx`.
//!
//! Modules:
//! - `conf`    : runtime configuration and output paths
//! - `spec`    : document models, report outcomes and errors
//! - `util`    : numerals, labels, date stamps, style presets
//! - `master`  : inventory ledger
//! - `demand`  : demand log
//! - `request` : request log and per-user grouping
pub mod conf;
pub mod demand;
pub mod master;
pub mod request;
pub mod spec;
pub mod util;

pub use conf::SpecReportConfig;
pub use demand::write_inventory_demand;
pub use master::write_inventory_master;
pub use request::{group_requests_by_user, write_inventory_request, write_inventory_request_user};
pub use spec::{
    ReportError, SpecDemandDocument, SpecDependencyDocument, SpecLedgerTotals, SpecMasterDocument,
    SpecMasterReport, SpecRequestDocument,
};
pub use util::{derive_current_date_stamp, read_json_document};
