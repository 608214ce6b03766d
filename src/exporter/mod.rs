pub mod csv_exporter;
pub mod report;

pub use csv_exporter::{CsvExporter, CSV_HEADER};
pub use report::ScanReport;
