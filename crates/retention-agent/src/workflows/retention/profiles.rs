use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::domain::{CustomerId, CustomerProfile};

/// Read-only table of customer account facts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDirectory {
    profiles: HashMap<CustomerId, CustomerProfile>,
}

impl ProfileDirectory {
    /// Roster of the accounts seeded in the demo environment.
    pub fn standard() -> Self {
        [
            ("7590-VHVEG", CustomerProfile::new(1, 29.85, "DSL")),
            ("5575-GNVDE", CustomerProfile::new(34, 56.95, "DSL")),
            ("3668-QPYBK", CustomerProfile::new(2, 53.85, "Fiber Optic")),
            ("7795-CFOCW", CustomerProfile::new(45, 42.30, "DSL")),
            ("9237-HQITU", CustomerProfile::new(2, 70.70, "Fiber Optic")),
        ]
        .into_iter()
        .map(|(id, profile)| (CustomerId::from(id), profile))
        .collect()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ProfileImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Import a `customerID,Tenure,MonthlyCharges,InternetService` export.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ProfileImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut profiles = HashMap::new();
        for (offset, record) in csv_reader.deserialize::<ProfileRow>().enumerate() {
            let row = record?;
            // header occupies line 1
            let line = offset + 2;
            let (customer_id, profile) = row.into_profile(line)?;
            profiles.insert(customer_id, profile);
        }

        Ok(Self { profiles })
    }

    /// Exact-match lookup. A miss yields [`CustomerProfile::unknown`].
    pub fn lookup(&self, customer_id: &CustomerId) -> CustomerProfile {
        self.profiles
            .get(customer_id)
            .cloned()
            .unwrap_or_else(CustomerProfile::unknown)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl FromIterator<(CustomerId, CustomerProfile)> for ProfileDirectory {
    fn from_iter<I: IntoIterator<Item = (CustomerId, CustomerProfile)>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    #[serde(rename = "customerID")]
    customer_id: String,
    #[serde(rename = "Tenure")]
    tenure: i64,
    #[serde(rename = "MonthlyCharges")]
    monthly_charges: f64,
    #[serde(rename = "InternetService")]
    internet_service: String,
}

impl ProfileRow {
    fn into_profile(self, line: usize) -> Result<(CustomerId, CustomerProfile), ProfileImportError> {
        let invalid = |reason: &str| ProfileImportError::InvalidRow {
            line,
            reason: reason.to_string(),
        };

        if self.customer_id.is_empty() {
            return Err(invalid("customerID is blank"));
        }
        let tenure_months =
            u32::try_from(self.tenure).map_err(|_| invalid("Tenure must be a non-negative integer"))?;
        if !self.monthly_charges.is_finite() || self.monthly_charges < 0.0 {
            return Err(invalid("MonthlyCharges must be a non-negative amount"));
        }

        Ok((
            CustomerId(self.customer_id),
            CustomerProfile::new(tenure_months, self.monthly_charges, self.internet_service),
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileImportError {
    #[error("failed to read profile export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid profile CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid profile row on line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },
}
