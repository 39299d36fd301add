use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One vendor-period record.
///
/// `category`, `region` and `date` are `None` when the source file has no
/// column bound to them; filters on an absent value always pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    #[serde(rename = "Vendor")]
    pub vendor: String,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Region")]
    pub region: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "OnTimeDeliveries")]
    pub on_time_deliveries: u32,
    #[serde(rename = "TotalDeliveries")]
    pub total_deliveries: u32,
    #[serde(rename = "Defects")]
    pub defects: u32,
    #[serde(rename = "TotalUnits")]
    pub total_units: u32,
    #[serde(rename = "Spend")]
    pub spend: f64,
    #[serde(rename = "Compliant")]
    pub compliant: bool,
    #[serde(rename = "LeadTime")]
    pub lead_time: f64,
}

/// Canonical CSV layout for observations, used when writing the sample
/// dataset so it can be read back through the loader unchanged.
#[derive(Debug, Serialize)]
pub struct ObservationRow<'a> {
    #[serde(rename = "Vendor")]
    pub vendor: &'a str,
    #[serde(rename = "Category")]
    pub category: Option<&'a str>,
    #[serde(rename = "Region")]
    pub region: Option<&'a str>,
    #[serde(rename = "Date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "OnTimeDeliveries")]
    pub on_time_deliveries: u32,
    #[serde(rename = "TotalDeliveries")]
    pub total_deliveries: u32,
    #[serde(rename = "Defects")]
    pub defects: u32,
    #[serde(rename = "TotalUnits")]
    pub total_units: u32,
    #[serde(rename = "Spend")]
    pub spend: f64,
    #[serde(rename = "Compliant")]
    pub compliant: u8,
    #[serde(rename = "LeadTime")]
    pub lead_time: f64,
}

impl<'a> From<&'a Observation> for ObservationRow<'a> {
    fn from(o: &'a Observation) -> Self {
        ObservationRow {
            vendor: &o.vendor,
            category: o.category.as_deref(),
            region: o.region.as_deref(),
            date: o.date,
            on_time_deliveries: o.on_time_deliveries,
            total_deliveries: o.total_deliveries,
            defects: o.defects,
            total_units: o.total_units,
            spend: o.spend,
            compliant: u8::from(o.compliant),
            lead_time: o.lead_time,
        }
    }
}

/// Per-vendor totals and means over a set of observations.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorSummary {
    pub vendor: String,
    pub category: Option<String>,
    pub region: Option<String>,
    /// Set when the vendor's observations disagree on category or region.
    pub mixed_attributes: bool,
    pub on_time_deliveries: u64,
    pub total_deliveries: u64,
    pub defects: u64,
    pub total_units: u64,
    pub spend: f64,
    pub compliance: f64,
    pub lead_time: f64,
}

/// A summary plus its derived rates and composite score. This is the row
/// shape of the exported CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorScore {
    #[serde(rename = "Vendor")]
    pub vendor: String,
    #[serde(rename = "OnTimeDeliveries")]
    pub on_time_deliveries: u64,
    #[serde(rename = "TotalDeliveries")]
    pub total_deliveries: u64,
    #[serde(rename = "Defects")]
    pub defects: u64,
    #[serde(rename = "TotalUnits")]
    pub total_units: u64,
    #[serde(rename = "Spend")]
    pub spend: f64,
    #[serde(rename = "Compliant")]
    pub compliance: f64,
    #[serde(rename = "LeadTime")]
    pub lead_time: f64,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Region")]
    pub region: Option<String>,
    #[serde(rename = "OnTimeDeliveryRate")]
    pub on_time_rate: f64,
    #[serde(rename = "QualityScore")]
    pub quality_score: f64,
    #[serde(rename = "ComplianceRate")]
    pub compliance_rate: f64,
    #[serde(rename = "AvgLeadTime")]
    pub avg_lead_time: f64,
    #[serde(rename = "OverallScore")]
    pub overall_score: f64,
    /// Zero total deliveries or zero total units; rates hold the `0.0`
    /// sentinel and the row never ranks.
    #[serde(rename = "InsufficientData")]
    pub insufficient_data: bool,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct LeaderboardRow {
    #[serde(rename = "Vendor")]
    #[tabled(rename = "Vendor")]
    pub vendor: String,
    #[serde(rename = "OverallScore")]
    #[tabled(rename = "OverallScore")]
    pub overall_score: String,
    #[serde(rename = "OnTimeDeliveryRate")]
    #[tabled(rename = "OnTimeDeliveryRate")]
    pub on_time_rate: String,
    #[serde(rename = "QualityScore")]
    #[tabled(rename = "QualityScore")]
    pub quality_score: String,
    #[serde(rename = "ComplianceRate")]
    #[tabled(rename = "ComplianceRate")]
    pub compliance_rate: String,
    #[serde(rename = "AvgLeadTime")]
    #[tabled(rename = "AvgLeadTime")]
    pub avg_lead_time: String,
    #[serde(rename = "Spend")]
    #[tabled(rename = "Spend")]
    pub spend: String,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct KpiRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}
