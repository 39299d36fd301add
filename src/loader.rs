use crate::error::LoadError;
use crate::mapping::{ColumnMapping, Field, ResolvedColumns};
use crate::types::Observation;
use crate::util::{parse_count_safe, parse_date_safe, parse_f64_safe, parse_flag_safe};
use calamine::{open_workbook_auto, Data, Reader};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    /// Rows kept despite on-time > total deliveries or defects > units.
    pub invariant_warnings: usize,
}

/// File extensions read as spreadsheets; everything else is read as CSV.
const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Load observations from a CSV file or, by extension, the first sheet of a
/// spreadsheet. `columns` is the user's `field -> column` dictionary; an
/// empty one means canonical headers.
pub fn load_csv(
    path: impl AsRef<Path>,
    columns: &HashMap<String, Option<String>>,
) -> Result<(Vec<Observation>, LoadReport), LoadError> {
    let path = path.as_ref();
    if is_spreadsheet(path) {
        return load_spreadsheet(path, columns);
    }
    info!(path = %path.display(), "Loading observations");
    let file = std::fs::File::open(path)?;
    load_from_reader(file, columns)
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SPREADSHEET_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

pub fn load_from_reader<R: Read>(
    reader: R,
    columns: &HashMap<String, Option<String>>,
) -> Result<(Vec<Observation>, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    load_records(&headers, rdr.records(), columns)
}

/// Read the first worksheet; its first row is the header row.
pub fn load_spreadsheet(
    path: impl AsRef<Path>,
    columns: &HashMap<String, Option<String>>,
) -> Result<(Vec<Observation>, LoadReport), LoadError> {
    let path = path.as_ref();
    info!(path = %path.display(), "Loading observations from spreadsheet");
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or(LoadError::NoWorksheet)??;

    let mut rows = range
        .rows()
        .map(|row| StringRecord::from(row.iter().map(cell_text).collect::<Vec<_>>()));
    let headers = rows.next().unwrap_or_default();
    load_records(&headers, rows.map(Ok), columns)
}

/// Spreadsheet cell as the text a CSV export would hold.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

fn load_records(
    headers: &StringRecord,
    records: impl Iterator<Item = Result<StringRecord, csv::Error>>,
    columns: &HashMap<String, Option<String>>,
) -> Result<(Vec<Observation>, LoadReport), LoadError> {
    let header_names: Vec<&str> = headers.iter().collect();
    let mapping = ColumnMapping::from_pairs(&header_names, columns)?;
    let resolved = mapping.resolve(&header_names)?;
    debug!(?mapping, "Resolved column mapping");

    let mut report = LoadReport::default();
    let mut data = Vec::new();

    for result in records {
        report.total_rows += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(row = report.total_rows, error = %e, "Unreadable row");
                report.parse_errors += 1;
                continue;
            }
        };
        let Some(obs) = parse_row(&record, &resolved) else {
            debug!(row = report.total_rows, "Skipping row with unparseable fields");
            report.parse_errors += 1;
            continue;
        };
        if obs.on_time_deliveries > obs.total_deliveries || obs.defects > obs.total_units {
            report.invariant_warnings += 1;
        }
        data.push(obs);
    }

    report.loaded_rows = data.len();
    if report.parse_errors > 0 {
        warn!(skipped = report.parse_errors, "Rows skipped due to parse errors");
    }
    if report.invariant_warnings > 0 {
        warn!(
            rows = report.invariant_warnings,
            "Rows with on-time > total deliveries or defects > units; rates may exceed 1"
        );
    }
    info!(
        total = report.total_rows,
        loaded = report.loaded_rows,
        "Finished loading observations"
    );
    Ok((data, report))
}

fn parse_row(record: &StringRecord, cols: &ResolvedColumns) -> Option<Observation> {
    let vendor = cols.get(record, Field::Vendor)?.trim();
    if vendor.is_empty() {
        return None;
    }

    // Bound-but-blank labels become "Unknown"; unbound stays None so the
    // matching filter passes every row.
    let label = |field: Field| -> Option<String> {
        if !cols.is_bound(field) {
            return None;
        }
        let v = cols.get(record, field).unwrap_or("").trim();
        Some(if v.is_empty() { "Unknown".to_string() } else { v.to_string() })
    };

    let date = if cols.is_bound(Field::Date) {
        Some(parse_date_safe(cols.get(record, Field::Date))?)
    } else {
        None
    };

    let spend = parse_f64_safe(cols.get(record, Field::Spend)).filter(|v| *v >= 0.0)?;
    let lead_time = parse_f64_safe(cols.get(record, Field::LeadTime)).filter(|v| *v >= 0.0)?;

    Some(Observation {
        vendor: vendor.to_string(),
        category: label(Field::Category),
        region: label(Field::Region),
        date,
        on_time_deliveries: parse_count_safe(cols.get(record, Field::OnTimeDeliveries))?,
        total_deliveries: parse_count_safe(cols.get(record, Field::TotalDeliveries))?,
        defects: parse_count_safe(cols.get(record, Field::Defects))?,
        total_units: parse_count_safe(cols.get(record, Field::TotalUnits))?,
        spend,
        compliant: parse_flag_safe(cols.get(record, Field::Compliant))?,
        lead_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const CANONICAL: &str = "\
Vendor,Category,Region,Date,OnTimeDeliveries,TotalDeliveries,\
Defects,TotalUnits,Spend,Compliant,LeadTime
Acme,Packaging,North,2023-01-01,9,10,1,120,\"12,000\",1,3.5
Acme,Packaging,North,2023-02-01 00:00:00,10,12,0,150,15000,0,4.5
Bolt,Services,,2023-01-01,8,10,2,100,20000,true,6
";

    #[test]
    fn test_load_canonical_headers() {
        let (data, report) = load_from_reader(CANONICAL.as_bytes(), &HashMap::new()).unwrap();
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.loaded_rows, 3);
        assert_eq!(report.parse_errors, 0);

        assert_eq!(data[0].vendor, "Acme");
        assert_eq!(data[0].spend, 12000.0);
        assert!(data[0].compliant);
        assert_eq!(data[1].date, NaiveDate::from_ymd_opt(2023, 2, 1));
        assert!(!data[1].compliant);
        assert_eq!(data[2].region.as_deref(), Some("Unknown"));
    }

    #[test]
    fn test_bad_rows_are_counted_and_skipped() {
        let csv = "\
Vendor,OnTimeDeliveries,TotalDeliveries,Defects,TotalUnits,Spend,Compliant,LeadTime,Date
A,9,10,1,120,100,1,3,2023-01-01
B,nine,10,1,120,100,1,3,2023-01-01
C,9,10,1,120,100,1,3,not-a-date
,9,10,1,120,100,1,3,2023-01-01
D,9,10,1,120,-5,1,3,2023-01-01
";
        let (data, report) = load_from_reader(csv.as_bytes(), &HashMap::new()).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(report.total_rows, 5);
        assert_eq!(report.parse_errors, 4);
    }

    #[test]
    fn test_unbound_optional_columns_are_none() {
        let csv = "\
Vendor,OnTimeDeliveries,TotalDeliveries,Defects,TotalUnits,Spend,Compliant,LeadTime
A,9,10,1,120,100,1,3
";
        let (data, _) = load_from_reader(csv.as_bytes(), &HashMap::new()).unwrap();
        assert_eq!(data[0].category, None);
        assert_eq!(data[0].region, None);
        assert_eq!(data[0].date, None);
    }

    #[test]
    fn test_invariant_violations_are_kept_and_counted() {
        let csv = "\
Vendor,OnTimeDeliveries,TotalDeliveries,Defects,TotalUnits,Spend,Compliant,LeadTime
A,14,10,1,120,100,1,3
";
        let (data, report) = load_from_reader(csv.as_bytes(), &HashMap::new()).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(report.invariant_warnings, 1);
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let csv = "Vendor,Spend\nA,100\n";
        let err = load_from_reader(csv.as_bytes(), &HashMap::new()).unwrap_err();
        assert!(matches!(err, LoadError::Mapping(_)));
    }

    #[test]
    fn test_load_xlsx_first_sheet_with_mapping() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendors.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let headers = [
            "Supplier", "Date", "OnTime", "Deliveries", "Defects", "Units", "Cost", "OK", "Days",
        ];
        for (col, h) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *h).unwrap();
        }
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let rows = [
            ("Acme", 9.0, 10.0, 1.0, 120.0, 12000.0, 1.0, 3.5),
            ("Bolt", 8.0, 10.0, 2.0, 100.0, 20000.0, 0.0, 6.0),
        ];
        for (i, (vendor, on_time, total, defects, units, spend, ok, lead)) in
            rows.into_iter().enumerate()
        {
            let r = i as u32 + 1;
            sheet.write_string(r, 0, vendor).unwrap();
            let date = ExcelDateTime::from_ymd(2023, r as u8, 1).unwrap();
            sheet.write_datetime_with_format(r, 1, &date, &date_format).unwrap();
            let values = [on_time, total, defects, units, spend, ok, lead];
            for (col, v) in values.into_iter().enumerate() {
                sheet.write_number(r, col as u16 + 2, v).unwrap();
            }
        }
        workbook.save(&path).unwrap();

        let columns: HashMap<String, Option<String>> = [
            ("Vendor", "Supplier"),
            ("OnTimeDeliveries", "OnTime"),
            ("TotalDeliveries", "Deliveries"),
            ("TotalUnits", "Units"),
            ("Spend", "Cost"),
            ("Compliant", "OK"),
            ("LeadTime", "Days"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), Some(v.to_string())))
        .collect();

        let (data, report) = load_csv(&path, &columns).unwrap();
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.parse_errors, 0);
        assert_eq!(data[0].vendor, "Acme");
        assert_eq!(data[0].total_units, 120);
        assert_eq!(data[0].spend, 12000.0);
        assert!(data[0].compliant);
        assert!(!data[1].compliant);
        assert_eq!(data[1].lead_time, 6.0);
        assert_eq!(data[0].date, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(data[1].date, NaiveDate::from_ymd_opt(2023, 2, 1));
        assert_eq!(data[0].category, None);
    }

    #[test]
    fn test_spreadsheet_extension_dispatch() {
        assert!(is_spreadsheet(Path::new("data/vendors.XLSX")));
        assert!(is_spreadsheet(Path::new("vendors.ods")));
        assert!(!is_spreadsheet(Path::new("vendors.csv")));
        assert!(!is_spreadsheet(Path::new("vendors")));
    }

    #[test]
    fn test_unreadable_spreadsheet_is_spreadsheet_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, "Vendor,Spend\nA,1\n").unwrap();
        let err = load_csv(&path, &HashMap::new()).unwrap_err();
        assert!(matches!(err, LoadError::Spreadsheet(_)));
    }

    #[test]
    fn test_load_csv_missing_file_is_io_error() {
        let err = load_csv("/definitely/not/here.csv", &HashMap::new()).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
