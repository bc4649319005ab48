//! Data sources: the hosted table store and the embedded dataset.

pub mod dataset;
pub mod remote;
pub mod source;

pub use dataset::StaticDataset;
pub use remote::RemoteDb;
pub use source::{CitySource, DataSourceKind, ReportGateway, SourceFilter};

/// Table names as constants.
pub mod tables {
    pub const CITIES: &str = "cities";
    pub const INCIDENT_REPORTS: &str = "incident_reports";
}
