//! Reports repo. Reports are immutable once stored
use models::*;
use repos::types::{RepoResult, Storage};

pub struct ReportsRepoImpl {
    pub storage: Storage,
    pub user_id: Option<UserId>,
}

pub trait ReportsRepo {
    /// Creates new report
    fn create(&self, report: Report) -> RepoResult<Report>;

    /// Get report
    fn get(&self, report_id: ReportId) -> RepoResult<Option<Report>>;

    /// List all reports ordered by completion time
    fn list(&self) -> RepoResult<Vec<Report>>;
}

impl ReportsRepoImpl {
    pub fn new(storage: Storage, user_id: Option<UserId>) -> Self {
        Self { storage, user_id }
    }
}

impl ReportsRepo for ReportsRepoImpl {
    fn create(&self, report: Report) -> RepoResult<Report> {
        debug!("User {:?} creates report {:?}.", self.user_id, report);
        let mut tables = self.storage.lock()?;
        tables.reports.insert(report.id(), report.clone());
        Ok(report)
    }

    fn get(&self, report_id: ReportId) -> RepoResult<Option<Report>> {
        debug!("Find report with id {}.", report_id);
        let tables = self.storage.lock()?;
        Ok(tables.reports.get(&report_id).cloned())
    }

    fn list(&self) -> RepoResult<Vec<Report>> {
        debug!("Find all reports.");
        let tables = self.storage.lock()?;
        let mut reports: Vec<Report> = tables.reports.values().cloned().collect();
        reports.sort_by_key(|r| r.completion_date_time());
        Ok(reports)
    }
}
