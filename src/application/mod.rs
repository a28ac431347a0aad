//! Applicant data and the contract for submitting it to a vacancy form.
//!
//! The actual form automation lives outside this crate; anything implementing
//! [`ApplicationSubmitter`] can be driven over the harvested vacancies.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::models::VacancyRecord;

/// Fixed answers for form fields the applicant file does not carry
pub struct ApplicationDefaults;

impl ApplicationDefaults {
    pub const GERMAN_LEVEL: &'static str = "Fließend";
    pub const NATIONALITY: &'static str = "EU mit unbefristeter Arbeitserlaubnis";
    pub const SOURCE: &'static str = "JobUFO";
    pub const COUNTRY: &'static str = "Deutschland";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F", alias = "W")]
    Female,
}

impl Gender {
    /// Salutation as offered by the form's select box
    pub fn salutation(self) -> &'static str {
        match self {
            Self::Male => "Herr",
            Self::Female => "Frau",
        }
    }
}

/// Applicant data as stored in the applicant JSON file
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicantRecord {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub birthday: String,
    pub gender: Gender,
    /// URL of the CV, downloaded before it is attached to the form
    pub cv_path: String,
}

impl ApplicantRecord {
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read applicant file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid applicant file {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationOutcome {
    Submitted,
    /// The site refused the form; carries its validation message
    Rejected(String),
}

#[async_trait]
pub trait ApplicationSubmitter: Send + Sync {
    async fn submit(&self, vacancy_url: &str, applicant: &ApplicantRecord) -> Result<ApplicationOutcome>;
}

/// Submits `applicant` to every vacancy in order.
///
/// A submission that errors is reported as rejected and does not stop the rest.
pub async fn submit_all<S: ApplicationSubmitter + ?Sized>(
    submitter: &S,
    records: &[VacancyRecord],
    applicant: &ApplicantRecord,
) -> Vec<(String, ApplicationOutcome)> {
    let mut outcomes = Vec::with_capacity(records.len());

    for record in records {
        let outcome = match submitter.submit(&record.url, applicant).await {
            Ok(outcome) => outcome,
            Err(e) => ApplicationOutcome::Rejected(e.to_string()),
        };

        match &outcome {
            ApplicationOutcome::Submitted => info!("Submitted application for {}", record.url),
            ApplicationOutcome::Rejected(reason) => {
                warn!("Can not submit form for {}: {}", record.url, reason);
            }
        }
        outcomes.push((record.url.clone(), outcome));
    }

    outcomes
}

/// File name of the CV: the last path segment of its url, percent-decoded
pub fn cv_file_name(cv_url: &str) -> Option<String> {
    let without_query = cv_url.split(['?', '#']).next().unwrap_or_default();
    let segment = without_query.rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    urlencoding::decode(segment).ok().map(|name| name.into_owned())
}
