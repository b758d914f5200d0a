//! Model repair reports and their builder
use chrono::{DateTime, Utc};
use failure::Error as FailureError;

use errors::Error;
use models::types::ReportId;
use models::validation_rules::*;

/// Technician's record of finished repair work
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Report {
    id: ReportId,
    repair_details: String,
    repair_summary: String,
    completion_date_time: DateTime<Utc>,
    created_date_time: DateTime<Utc>,
}

impl Report {
    pub fn id(&self) -> ReportId {
        self.id
    }

    pub fn repair_details(&self) -> &str {
        &self.repair_details
    }

    pub fn repair_summary(&self) -> &str {
        &self.repair_summary
    }

    pub fn completion_date_time(&self) -> DateTime<Utc> {
        self.completion_date_time
    }

    pub fn created_date_time(&self) -> DateTime<Utc> {
        self.created_date_time
    }
}

/// Payload for creating report, missing completion time means "completed now"
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NewReport {
    pub repair_details: String,
    pub repair_summary: String,
    pub completion_date_time: Option<DateTime<Utc>>,
}

impl NewReport {
    /// Runs the payload through `ReportBuilder`
    pub fn build(&self) -> Result<Report, FailureError> {
        let mut builder = ReportBuilder::new();
        builder
            .with_repair_details(&self.repair_details)
            .and_then(|builder| builder.with_repair_summary(&self.repair_summary))
            .and_then(|builder| match self.completion_date_time {
                Some(completion_date_time) => builder.with_completion_date_time(completion_date_time),
                None => Ok(builder.completed_now()),
            })
            .and_then(|builder| builder.build())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum ReportBuilderState {
    Empty,
    PartiallyConfigured,
    Valid,
}

/// Collects report fields. Each setter rejects a bad value right away and keeps the
/// previous one; `build` can be called any number of times.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    repair_details: Option<String>,
    repair_summary: Option<String>,
    completion_date_time: Option<DateTime<Utc>>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repair_details(&mut self, repair_details: &str) -> Result<&mut Self, FailureError> {
        validate_not_blank(repair_details).map_err(|e| Error::invalid("repair_details", e))?;
        self.repair_details = Some(repair_details.to_string());
        Ok(self)
    }

    pub fn with_repair_summary(&mut self, repair_summary: &str) -> Result<&mut Self, FailureError> {
        validate_not_blank(repair_summary).map_err(|e| Error::invalid("repair_summary", e))?;
        self.repair_summary = Some(repair_summary.to_string());
        Ok(self)
    }

    pub fn with_completion_date_time(&mut self, completion_date_time: DateTime<Utc>) -> Result<&mut Self, FailureError> {
        validate_not_in_future(&completion_date_time).map_err(|e| Error::invalid("completion_date_time", e))?;
        self.completion_date_time = Some(completion_date_time);
        Ok(self)
    }

    pub fn completed_now(&mut self) -> &mut Self {
        self.completion_date_time = Some(Utc::now());
        self
    }

    /// All three fields are present and still satisfy their rules
    pub fn is_valid(&self) -> bool {
        let details = self.repair_details.as_ref().map(|d| validate_not_blank(d).is_ok());
        let summary = self.repair_summary.as_ref().map(|s| validate_not_blank(s).is_ok());
        let completion = self.completion_date_time.as_ref().map(|c| validate_not_in_future(c).is_ok());
        details == Some(true) && summary == Some(true) && completion == Some(true)
    }

    pub fn state(&self) -> ReportBuilderState {
        if self.repair_details.is_none() && self.repair_summary.is_none() && self.completion_date_time.is_none() {
            ReportBuilderState::Empty
        } else if self.is_valid() {
            ReportBuilderState::Valid
        } else {
            ReportBuilderState::PartiallyConfigured
        }
    }

    pub fn build(&self) -> Result<Report, FailureError> {
        match (&self.repair_details, &self.repair_summary, self.completion_date_time) {
            (Some(details), Some(summary), Some(completion)) if self.is_valid() => Ok(Report {
                id: ReportId::new(),
                repair_details: details.clone(),
                repair_summary: summary.clone(),
                completion_date_time: completion,
                created_date_time: Utc::now(),
            }),
            _ => Err(Error::IllegalState("Report is incomplete or invalid".to_string()).into()),
        }
    }

    /// Discards every field, back to `Empty`
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }
}
