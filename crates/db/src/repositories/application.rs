//! Application repository.

use anchors_core::RecordId;
use anchors_core::application::{
    APPLICATIONS_TABLE, Application, ApplicationStatus, NewApplication, ReviewDecision,
};
use chrono::{DateTime, Utc};
use tracing::info;

use super::RepositoryError;
use crate::client::TableClient;
use crate::error::ClientError;
use crate::query::{Filters, QuerySpec};

const NEWEST_FIRST: &str = "created_at.desc";

/// Application repository.
#[derive(Debug, Clone)]
pub struct ApplicationRepository {
    tables: TableClient,
}

impl ApplicationRepository {
    /// Creates a new application repository.
    #[must_use]
    pub const fn new(tables: TableClient) -> Self {
        Self { tables }
    }

    /// All applications, newest first.
    pub async fn list(&self) -> Result<Vec<Application>, ClientError> {
        self.tables
            .select(
                APPLICATIONS_TABLE,
                &QuerySpec::new().select("*").order(NEWEST_FIRST),
            )
            .await
    }

    /// Applications in one status, newest first.
    pub async fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<Application>, ClientError> {
        self.tables
            .select(
                APPLICATIONS_TABLE,
                &QuerySpec::new()
                    .select("*")
                    .eq("status", status)
                    .order(NEWEST_FIRST),
            )
            .await
    }

    /// Finds an application by id.
    pub async fn find_by_id(&self, id: &RecordId) -> Result<Option<Application>, ClientError> {
        let rows: Vec<Application> = self
            .tables
            .select(APPLICATIONS_TABLE, &QuerySpec::new().eq("id", id).limit(1))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Stores a new pending application.
    pub async fn submit(&self, application: &NewApplication) -> Result<Application, ClientError> {
        let created: Application = self
            .tables
            .insert_one(APPLICATIONS_TABLE, application)
            .await?;
        info!(application_id = %created.id, "application submitted");
        Ok(created)
    }

    /// Approves or rejects a pending application.
    ///
    /// The write is conditioned on the row still being pending, so two
    /// admins cannot both review it.
    pub async fn review(
        &self,
        id: &RecordId,
        decision: ReviewDecision,
        reviewer: &str,
        at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        let application = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Application {id}")))?;
        let review = application.review(decision, reviewer, at)?;

        let filters = Filters::new()
            .eq("id", id)
            .eq("status", ApplicationStatus::Pending);
        let rows: Option<Vec<Application>> = self
            .tables
            .update(APPLICATIONS_TABLE, &filters, &review)
            .await?;

        let reviewed = match rows {
            Some(rows) => rows.into_iter().next().ok_or_else(|| {
                RepositoryError::Stale(format!("Application {id} was reviewed by someone else"))
            })?,
            None => Application {
                status: review.status,
                reviewed_by: Some(review.reviewed_by),
                reviewed_at: Some(review.reviewed_at),
                ..application
            },
        };
        info!(application_id = %id, status = %reviewed.status, reviewer, "application reviewed");
        Ok(reviewed)
    }
}
