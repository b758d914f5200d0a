//! Reports Services, technicians' records of finished repairs

use chrono::{DateTime, Utc};

use errors::Error;
use models::*;
use repos::ReposFactory;
use services::types::ServiceResult;
use services::Service;

pub trait ReportsService {
    /// Creates report, missing completion time means the repair was completed now
    fn create_report(&self, payload: NewReport) -> ServiceResult<Report>;
    /// Returns report by id
    fn get_report(&self, report_id: ReportId) -> ServiceResult<Option<Report>>;
    /// Returns all reports
    fn list_reports(&self) -> ServiceResult<Vec<Report>>;
    /// Returns reports completed between `start_date` and `end_date`, both inclusive
    fn reports_in_period(&self, start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> ServiceResult<Vec<Report>>;
}

impl<F: ReposFactory> ReportsService for Service<F> {
    fn create_report(&self, payload: NewReport) -> ServiceResult<Report> {
        let user_id = self.dynamic_context.user_id;
        let reports_repo = self.static_context.repo_factory.create_reports_repo(user_id);

        payload
            .build()
            .and_then(|report| reports_repo.create(report))
            .map(|report| {
                info!("Report {} created, completed at {}.", report.id(), report.completion_date_time());
                report
            })
            .map_err(|e| e.context("Service Reports, create endpoint error occurred.").into())
    }

    fn get_report(&self, report_id: ReportId) -> ServiceResult<Option<Report>> {
        let user_id = self.dynamic_context.user_id;
        let reports_repo = self.static_context.repo_factory.create_reports_repo(user_id);

        reports_repo
            .get(report_id)
            .map_err(|e| e.context("Service Reports, get_report endpoint error occurred.").into())
    }

    fn list_reports(&self) -> ServiceResult<Vec<Report>> {
        let user_id = self.dynamic_context.user_id;
        let reports_repo = self.static_context.repo_factory.create_reports_repo(user_id);

        reports_repo
            .list()
            .map_err(|e| e.context("Service Reports, list endpoint error occurred.").into())
    }

    fn reports_in_period(&self, start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> ServiceResult<Vec<Report>> {
        let user_id = self.dynamic_context.user_id;
        let reports_repo = self.static_context.repo_factory.create_reports_repo(user_id);

        if start_date > end_date {
            return Err(Error::Validate(validation_errors!({
                "start_date": ["range" => "Start of period must not be after its end"]
            })).into());
        }

        reports_repo
            .list()
            .map(|reports| {
                reports
                    .into_iter()
                    .filter(|r| r.completion_date_time() >= start_date && r.completion_date_time() <= end_date)
                    .collect()
            })
            .map_err(|e| e.context("Service Reports, reports_in_period endpoint error occurred.").into())
    }
}
