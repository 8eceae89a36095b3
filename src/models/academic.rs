use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{error::ApiError, models::content::merge_date, uploads::FormData};

pub const CALENDAR_COLUMNS: &str =
    "id, academic_year, semester, activity, activity_en, start_date, end_date, document_url, sort_order";

pub const DOCUMENT_COLUMNS: &str =
    "id, title, title_en, description, description_en, document_url, sort_order";

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub id: i64,
    pub academic_year: String,
    pub semester: Option<String>,
    pub activity: String,
    pub activity_en: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub document_url: Option<String>,
    pub sort_order: i64,
}

impl CalendarEntry {
    pub fn from_form(form: &FormData) -> Result<Self, ApiError> {
        let mut entry = Self {
            academic_year: form.required("academicYear")?,
            activity: form.required("activity")?,
            ..Default::default()
        };
        entry.merge(form)?;
        Ok(entry)
    }

    pub fn merge(&mut self, form: &FormData) -> Result<(), ApiError> {
        form.merge_text("academicYear", &mut self.academic_year);
        form.merge_opt("semester", &mut self.semester);
        form.merge_text("activity", &mut self.activity);
        form.merge_opt("activityEn", &mut self.activity_en);
        form.merge_opt("documentUrl", &mut self.document_url);
        merge_date(form, "startDate", &mut self.start_date)?;
        merge_date(form, "endDate", &mut self.end_date)?;
        if let Some(order) = form.int("sortOrder")? {
            self.sort_order = order;
        }

        if self.academic_year.is_empty() || self.activity.is_empty() {
            return Err(ApiError::bad_request("academicYear dan activity wajib diisi"));
        }
        if let (Some(start), Some(end)) = (&self.start_date, &self.end_date) {
            if end < start {
                return Err(ApiError::bad_request("endDate tidak boleh sebelum startDate"));
            }
        }
        Ok(())
    }
}

/// Academic policies and LPM legal basis share one shape and live in separate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    AcademicPolicy,
    LpmLegalBasis,
}

impl DocumentKind {
    /// Kind named by a route segment (`academic-policies`, `lpm-legal-basis`).
    pub fn from_segment(segment: &str) -> Result<Self, ApiError> {
        match segment {
            "academic-policies" => Ok(DocumentKind::AcademicPolicy),
            "lpm-legal-basis" => Ok(DocumentKind::LpmLegalBasis),
            other => Err(ApiError::not_found(format!("Halaman {other} tidak ditemukan"))),
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            DocumentKind::AcademicPolicy => "academic_policies",
            DocumentKind::LpmLegalBasis => "lpm_legal_basis",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::AcademicPolicy => "Kebijakan akademik",
            DocumentKind::LpmLegalBasis => "Dasar hukum LPM",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    pub id: i64,
    pub title: String,
    pub title_en: Option<String>,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub document_url: Option<String>,
    pub sort_order: i64,
}

impl DocumentEntry {
    pub fn from_form(form: &FormData) -> Result<Self, ApiError> {
        let mut entry = Self {
            title: form.required("title")?,
            ..Default::default()
        };
        entry.merge(form)?;
        Ok(entry)
    }

    pub fn merge(&mut self, form: &FormData) -> Result<(), ApiError> {
        form.merge_text("title", &mut self.title);
        form.merge_opt("titleEn", &mut self.title_en);
        form.merge_opt("description", &mut self.description);
        form.merge_opt("descriptionEn", &mut self.description_en);
        form.merge_opt("documentUrl", &mut self.document_url);
        if let Some(order) = form.int("sortOrder")? {
            self.sort_order = order;
        }
        if self.title.is_empty() {
            return Err(ApiError::bad_request("title wajib diisi"));
        }
        Ok(())
    }
}
