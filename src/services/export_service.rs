use std::collections::BTreeMap;

use chrono::Utc;

use crate::reporting::{Hub, Session};

use super::report_service::{ReportFilter, ReportRow, ReportService};
use super::{ServiceError, ServiceResult};

const FIXED_COLUMNS: [&str; 9] = [
    "report_id",
    "template_name",
    "username",
    "location_name",
    "report_period",
    "status",
    "submitted_at",
    "created_at",
    "updated_at",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// A flattened export batch: the fixed report columns plus one `data_<name>`
/// column per submitted value. Record maps are sparse; [`Export::headers`]
/// is the union over all records.
#[derive(Debug)]
pub struct Export {
    pub filename: String,
    pub format: ExportFormat,
    pub headers: Vec<String>,
    pub records: Vec<BTreeMap<String, String>>,
}

impl Export {
    /// Renders the batch in its chosen format.
    pub fn render(&self) -> ServiceResult<String> {
        match self.format {
            ExportFormat::Csv => self.to_csv_string(),
            ExportFormat::Json => Ok(serde_json::to_string_pretty(&self.records)
                .map_err(crate::errors::StorageError::from)?),
        }
    }

    fn to_csv_string(&self) -> ServiceResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for record in &self.records {
            let row: Vec<&str> = self
                .headers
                .iter()
                .map(|header| record.get(header).map(String::as_str).unwrap_or(""))
                .collect();
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| ServiceError::Invalid(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| ServiceError::Invalid(err.to_string()))
    }
}

pub struct ExportService;

impl ExportService {
    /// Flattens the filtered reports for download. Admin-only, through the
    /// same filter semantics as report search.
    pub fn export(
        hub: &Hub,
        session: &Session,
        filter: &ReportFilter,
        format: ExportFormat,
    ) -> ServiceResult<Export> {
        let rows = ReportService::search(hub, session, filter)?;
        let records: Vec<BTreeMap<String, String>> =
            rows.iter().map(Self::flatten_row).collect();

        let mut headers: Vec<String> = FIXED_COLUMNS.iter().map(|name| name.to_string()).collect();
        let mut data_columns: Vec<String> = records
            .iter()
            .flat_map(|record| record.keys())
            .filter(|key| key.starts_with("data_"))
            .cloned()
            .collect();
        data_columns.sort();
        data_columns.dedup();
        headers.extend(data_columns);

        let filename = format!(
            "reports_export_{}.{}",
            Utc::now().format("%Y%m%d_%H%M%S"),
            format.extension()
        );
        tracing::info!(records = records.len(), %filename, "reports exported");
        Ok(Export {
            filename,
            format,
            headers,
            records,
        })
    }

    fn flatten_row(row: &ReportRow) -> BTreeMap<String, String> {
        let report = &row.report;
        let mut record = BTreeMap::new();
        record.insert("report_id".into(), report.id.to_string());
        record.insert("template_name".into(), row.template_name.clone());
        record.insert("username".into(), row.username.clone());
        record.insert(
            "location_name".into(),
            row.location_name.clone().unwrap_or_default(),
        );
        record.insert("report_period".into(), report.report_period.to_string());
        record.insert("status".into(), report.status.as_str().to_string());
        record.insert(
            "submitted_at".into(),
            report
                .submitted_at
                .map(|timestamp| timestamp.to_rfc3339())
                .unwrap_or_default(),
        );
        record.insert("created_at".into(), report.created_at.to_rfc3339());
        record.insert("updated_at".into(), report.updated_at.to_rfc3339());
        for (name, value) in &report.data {
            record.insert(format!("data_{name}"), value.to_export_string());
        }
        record
    }
}
