//! Records kept in the JSON flat-file store.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{error::ApiError, uploads::FormData};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordMeta {
    pub id: String,
    pub slug: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A collection stored as `<COLLECTION>.json` and exposed under
/// `/api/admin/<COLLECTION>` and `/api/public/{locale}/<COLLECTION>`.
pub trait ContentRecord: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Indonesian label used in response messages.
    const LABEL: &'static str;
    /// Form key the slug is generated from; required on create.
    const SLUG_SOURCE: &'static str;
    /// Multipart field holding the attached file. Uploads land in `uploads/<COLLECTION>/`.
    const FILE_FIELD: &'static str;
    const FILE_FIELDS: &'static [&'static str] = &[Self::FILE_FIELD];

    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;

    /// Builds a record from a create request. `meta` is already filled in.
    fn from_form(meta: RecordMeta, form: &FormData) -> Result<Self, ApiError>;

    /// Overwrites the fields present in `form`; everything else is kept.
    fn merge(&mut self, form: &FormData) -> Result<(), ApiError>;

    fn slug_text(&self) -> &str;
    fn attachment(&self) -> Option<&str>;
    fn set_attachment(&mut self, path: Option<String>);
    fn category(&self) -> Option<&str>;

    /// Order used by the public listing.
    fn sort(_items: &mut [Self]) {}
}

pub fn merge_date(form: &FormData, key: &str, target: &mut Option<String>) -> Result<(), ApiError> {
    let Some(val) = form.text(key) else {
        return Ok(());
    };
    if val.is_empty() {
        *target = None;
        return Ok(());
    }
    *target = Some(parse_date(key, &val)?);
    Ok(())
}

/// Normalizes a `YYYY-MM-DD` date.
pub fn parse_date(key: &str, val: &str) -> Result<String, ApiError> {
    NaiveDate::parse_from_str(val.trim(), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| ApiError::bad_request(format!("Format {key} tidak valid. Gunakan YYYY-MM-DD")))
}

pub fn merge_time(form: &FormData, key: &str, target: &mut Option<String>) -> Result<(), ApiError> {
    let Some(val) = form.text(key) else {
        return Ok(());
    };
    if val.is_empty() {
        *target = None;
        return Ok(());
    }
    let time = NaiveTime::parse_from_str(&val, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&val, "%H:%M"))
        .or_else(|_| NaiveTime::parse_from_str(&val, "%H.%M"))
        .map_err(|_| ApiError::bad_request(format!("Format {key} tidak valid. Gunakan HH:MM")))?;
    *target = Some(time.format("%H:%M").to_string());
    Ok(())
}

pub fn merge_year(form: &FormData, key: &str, target: &mut Option<i64>) -> Result<(), ApiError> {
    if form.contains(key) {
        *target = form.int(key)?;
    }
    Ok(())
}

/// Present values first, `Some` compared by `cmp`, `None` last.
fn none_last<T: Ord>(a: &Option<T>, b: &Option<T>, desc: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if desc => b.cmp(a),
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

macro_rules! record_meta {
    () => {
        fn meta(&self) -> &RecordMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut RecordMeta {
            &mut self.meta
        }
    };
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Activity {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    pub title_en: Option<String>,
    pub description: String,
    pub description_en: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
}

impl ContentRecord for Activity {
    const COLLECTION: &'static str = "activities";
    const LABEL: &'static str = "Kegiatan";
    const SLUG_SOURCE: &'static str = "title";
    const FILE_FIELD: &'static str = "image";

    record_meta!();

    fn from_form(meta: RecordMeta, form: &FormData) -> Result<Self, ApiError> {
        let mut record = Self {
            meta,
            title: form.required("title")?,
            ..Default::default()
        };
        record.merge(form)?;
        Ok(record)
    }

    fn merge(&mut self, form: &FormData) -> Result<(), ApiError> {
        form.merge_text("title", &mut self.title);
        form.merge_opt("titleEn", &mut self.title_en);
        form.merge_text("description", &mut self.description);
        form.merge_opt("descriptionEn", &mut self.description_en);
        form.merge_opt("category", &mut self.category);
        form.merge_opt("location", &mut self.location);
        merge_date(form, "date", &mut self.date)
    }

    fn slug_text(&self) -> &str {
        &self.title
    }

    fn attachment(&self) -> Option<&str> {
        self.image.as_deref()
    }

    fn set_attachment(&mut self, path: Option<String>) {
        self.image = path;
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn sort(items: &mut [Self]) {
        items.sort_by(|a, b| none_last(&a.date, &b.date, true));
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Agenda {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    pub title_en: Option<String>,
    pub description: String,
    pub description_en: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
}

impl ContentRecord for Agenda {
    const COLLECTION: &'static str = "agenda";
    const LABEL: &'static str = "Agenda";
    const SLUG_SOURCE: &'static str = "title";
    const FILE_FIELD: &'static str = "image";

    record_meta!();

    fn from_form(meta: RecordMeta, form: &FormData) -> Result<Self, ApiError> {
        let mut record = Self {
            meta,
            title: form.required("title")?,
            ..Default::default()
        };
        record.merge(form)?;
        Ok(record)
    }

    fn merge(&mut self, form: &FormData) -> Result<(), ApiError> {
        form.merge_text("title", &mut self.title);
        form.merge_opt("titleEn", &mut self.title_en);
        form.merge_text("description", &mut self.description);
        form.merge_opt("descriptionEn", &mut self.description_en);
        form.merge_opt("category", &mut self.category);
        form.merge_opt("location", &mut self.location);
        merge_date(form, "date", &mut self.date)?;
        merge_time(form, "time", &mut self.time)
    }

    fn slug_text(&self) -> &str {
        &self.title
    }

    fn attachment(&self) -> Option<&str> {
        self.image.as_deref()
    }

    fn set_attachment(&mut self, path: Option<String>) {
        self.image = path;
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    // upcoming first
    fn sort(items: &mut [Self]) {
        items.sort_by(|a, b| {
            none_last(&a.date, &b.date, false).then_with(|| none_last(&a.time, &b.time, false))
        });
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Partner {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    pub description: String,
    pub description_en: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub since: Option<i64>,
    pub logo: Option<String>,
}

impl ContentRecord for Partner {
    const COLLECTION: &'static str = "partners";
    const LABEL: &'static str = "Mitra";
    const SLUG_SOURCE: &'static str = "name";
    const FILE_FIELD: &'static str = "logo";

    record_meta!();

    fn from_form(meta: RecordMeta, form: &FormData) -> Result<Self, ApiError> {
        let mut record = Self {
            meta,
            name: form.required("name")?,
            ..Default::default()
        };
        record.merge(form)?;
        Ok(record)
    }

    fn merge(&mut self, form: &FormData) -> Result<(), ApiError> {
        form.merge_text("name", &mut self.name);
        form.merge_text("description", &mut self.description);
        form.merge_opt("descriptionEn", &mut self.description_en);
        form.merge_opt("category", &mut self.category);
        form.merge_opt("country", &mut self.country);
        form.merge_opt("website", &mut self.website);
        merge_year(form, "since", &mut self.since)
    }

    fn slug_text(&self) -> &str {
        &self.name
    }

    fn attachment(&self) -> Option<&str> {
        self.logo.as_deref()
    }

    fn set_attachment(&mut self, path: Option<String>) {
        self.logo = path;
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn sort(items: &mut [Self]) {
        items.sort_by_key(|p| p.name.to_lowercase());
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scholarship {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    pub name_en: Option<String>,
    pub description: String,
    pub description_en: Option<String>,
    pub provider: Option<String>,
    pub coverage: Option<String>,
    pub coverage_en: Option<String>,
    pub requirements: Vec<String>,
    pub requirements_en: Vec<String>,
    pub deadline: Option<String>,
    pub link: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
}

impl ContentRecord for Scholarship {
    const COLLECTION: &'static str = "scholarships";
    const LABEL: &'static str = "Beasiswa";
    const SLUG_SOURCE: &'static str = "name";
    const FILE_FIELD: &'static str = "image";

    record_meta!();

    fn from_form(meta: RecordMeta, form: &FormData) -> Result<Self, ApiError> {
        let mut record = Self {
            meta,
            name: form.required("name")?,
            ..Default::default()
        };
        record.merge(form)?;
        Ok(record)
    }

    fn merge(&mut self, form: &FormData) -> Result<(), ApiError> {
        form.merge_text("name", &mut self.name);
        form.merge_opt("nameEn", &mut self.name_en);
        form.merge_text("description", &mut self.description);
        form.merge_opt("descriptionEn", &mut self.description_en);
        form.merge_opt("provider", &mut self.provider);
        form.merge_opt("coverage", &mut self.coverage);
        form.merge_opt("coverageEn", &mut self.coverage_en);
        form.merge_list("requirements", &mut self.requirements);
        form.merge_list("requirementsEn", &mut self.requirements_en);
        form.merge_opt("link", &mut self.link);
        form.merge_opt("category", &mut self.category);
        merge_date(form, "deadline", &mut self.deadline)
    }

    fn slug_text(&self) -> &str {
        &self.name
    }

    fn attachment(&self) -> Option<&str> {
        self.image.as_deref()
    }

    fn set_attachment(&mut self, path: Option<String>) {
        self.image = path;
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn sort(items: &mut [Self]) {
        items.sort_by(|a, b| none_last(&a.deadline, &b.deadline, false));
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Achievement {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    pub title_en: Option<String>,
    pub description: String,
    pub description_en: Option<String>,
    pub achiever: Option<String>,
    pub level: Option<String>,
    pub year: Option<i64>,
    pub category: Option<String>,
    pub image: Option<String>,
}

impl ContentRecord for Achievement {
    const COLLECTION: &'static str = "achievements";
    const LABEL: &'static str = "Prestasi";
    const SLUG_SOURCE: &'static str = "title";
    const FILE_FIELD: &'static str = "image";

    record_meta!();

    fn from_form(meta: RecordMeta, form: &FormData) -> Result<Self, ApiError> {
        let mut record = Self {
            meta,
            title: form.required("title")?,
            ..Default::default()
        };
        record.merge(form)?;
        Ok(record)
    }

    fn merge(&mut self, form: &FormData) -> Result<(), ApiError> {
        form.merge_text("title", &mut self.title);
        form.merge_opt("titleEn", &mut self.title_en);
        form.merge_text("description", &mut self.description);
        form.merge_opt("descriptionEn", &mut self.description_en);
        form.merge_opt("achiever", &mut self.achiever);
        form.merge_opt("level", &mut self.level);
        form.merge_opt("category", &mut self.category);
        merge_year(form, "year", &mut self.year)
    }

    fn slug_text(&self) -> &str {
        &self.title
    }

    fn attachment(&self) -> Option<&str> {
        self.image.as_deref()
    }

    fn set_attachment(&mut self, path: Option<String>) {
        self.image = path;
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn sort(items: &mut [Self]) {
        items.sort_by(|a, b| none_last(&a.year, &b.year, true));
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Research {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    pub title_en: Option<String>,
    #[serde(rename = "abstract")]
    pub summary: String,
    #[serde(rename = "abstractEn")]
    pub summary_en: Option<String>,
    pub researcher: Option<String>,
    pub faculty: Option<String>,
    pub year: Option<i64>,
    pub funding: Option<String>,
    pub category: Option<String>,
    pub document: Option<String>,
}

impl ContentRecord for Research {
    const COLLECTION: &'static str = "research";
    const LABEL: &'static str = "Penelitian";
    const SLUG_SOURCE: &'static str = "title";
    const FILE_FIELD: &'static str = "document";

    record_meta!();

    fn from_form(meta: RecordMeta, form: &FormData) -> Result<Self, ApiError> {
        let mut record = Self {
            meta,
            title: form.required("title")?,
            ..Default::default()
        };
        record.merge(form)?;
        Ok(record)
    }

    fn merge(&mut self, form: &FormData) -> Result<(), ApiError> {
        form.merge_text("title", &mut self.title);
        form.merge_opt("titleEn", &mut self.title_en);
        form.merge_text("abstract", &mut self.summary);
        form.merge_opt("abstractEn", &mut self.summary_en);
        form.merge_opt("researcher", &mut self.researcher);
        form.merge_opt("faculty", &mut self.faculty);
        form.merge_opt("funding", &mut self.funding);
        form.merge_opt("category", &mut self.category);
        merge_year(form, "year", &mut self.year)
    }

    fn slug_text(&self) -> &str {
        &self.title
    }

    fn attachment(&self) -> Option<&str> {
        self.document.as_deref()
    }

    fn set_attachment(&mut self, path: Option<String>) {
        self.document = path;
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn sort(items: &mut [Self]) {
        items.sort_by(|a, b| none_last(&a.year, &b.year, true));
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Publication {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    pub title_en: Option<String>,
    pub authors: Vec<String>,
    pub journal: Option<String>,
    pub year: Option<i64>,
    pub url: Option<String>,
    pub category: Option<String>,
    pub document: Option<String>,
}

impl ContentRecord for Publication {
    const COLLECTION: &'static str = "publications";
    const LABEL: &'static str = "Publikasi";
    const SLUG_SOURCE: &'static str = "title";
    const FILE_FIELD: &'static str = "document";

    record_meta!();

    fn from_form(meta: RecordMeta, form: &FormData) -> Result<Self, ApiError> {
        let mut record = Self {
            meta,
            title: form.required("title")?,
            ..Default::default()
        };
        record.merge(form)?;
        Ok(record)
    }

    fn merge(&mut self, form: &FormData) -> Result<(), ApiError> {
        form.merge_text("title", &mut self.title);
        form.merge_opt("titleEn", &mut self.title_en);
        form.merge_list("authors", &mut self.authors);
        form.merge_opt("journal", &mut self.journal);
        form.merge_opt("url", &mut self.url);
        form.merge_opt("category", &mut self.category);
        merge_year(form, "year", &mut self.year)
    }

    fn slug_text(&self) -> &str {
        &self.title
    }

    fn attachment(&self) -> Option<&str> {
        self.document.as_deref()
    }

    fn set_attachment(&mut self, path: Option<String>) {
        self.document = path;
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn sort(items: &mut [Self]) {
        items.sort_by(|a, b| none_last(&a.year, &b.year, true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn form(value: Value) -> FormData {
        match value {
            Value::Object(map) => FormData::from_json(map),
            _ => panic!("form must be an object"),
        }
    }

    #[test]
    fn create_requires_the_slug_source() {
        let err = Activity::from_form(RecordMeta::default(), &form(json!({ "description": "x" })));
        assert!(matches!(err, Err(ApiError::BadRequest(_))));

        let err = Partner::from_form(RecordMeta::default(), &form(json!({ "title": "x" })));
        assert!(err.is_err());
    }

    #[test]
    fn partial_merge_keeps_unspecified_fields() {
        let mut agenda = Agenda::from_form(
            RecordMeta::default(),
            &form(json!({
                "title": "Dies Natalis",
                "titleEn": "Anniversary",
                "date": "2025-09-01",
                "time": "08:00",
                "location": "Auditorium"
            })),
        )
        .unwrap();

        agenda.merge(&form(json!({ "location": "Gedung Rektorat" }))).unwrap();

        assert_eq!(agenda.title, "Dies Natalis");
        assert_eq!(agenda.title_en.as_deref(), Some("Anniversary"));
        assert_eq!(agenda.date.as_deref(), Some("2025-09-01"));
        assert_eq!(agenda.time.as_deref(), Some("08:00"));
        assert_eq!(agenda.location.as_deref(), Some("Gedung Rektorat"));
    }

    #[test]
    fn invalid_dates_are_rejected() {
        let result = Activity::from_form(
            RecordMeta::default(),
            &form(json!({ "title": "Seminar", "date": "01/09/2025" })),
        );
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn time_formats_are_normalized() {
        let mut time = None;
        merge_time(&form(json!({ "time": "13.30" })), "time", &mut time).unwrap();
        assert_eq!(time.as_deref(), Some("13:30"));
        merge_time(&form(json!({ "time": "07:15:00" })), "time", &mut time).unwrap();
        assert_eq!(time.as_deref(), Some("07:15"));
    }

    #[test]
    fn records_serialize_flat_camel_case() {
        let mut scholarship = Scholarship::from_form(
            RecordMeta {
                id: "1700000000000".into(),
                slug: "beasiswa-prestasi".into(),
                ..Default::default()
            },
            &form(json!({
                "name": "Beasiswa Prestasi",
                "requirements": ["IPK minimal 3,5", "Aktif organisasi"]
            })),
        )
        .unwrap();
        scholarship.set_attachment(Some("/uploads/scholarships/poster.png".into()));

        let value = serde_json::to_value(&scholarship).unwrap();
        assert_eq!(value["id"], "1700000000000");
        assert_eq!(value["slug"], "beasiswa-prestasi");
        assert_eq!(value["requirements"][1], "Aktif organisasi");
        assert_eq!(value["requirementsEn"], json!([]));
        assert_eq!(value["image"], "/uploads/scholarships/poster.png");

        let back: Scholarship = serde_json::from_value(value).unwrap();
        assert_eq!(back.meta.slug, "beasiswa-prestasi");
    }

    #[test]
    fn research_abstract_uses_the_public_key() {
        let research = Research::from_form(
            RecordMeta::default(),
            &form(json!({ "title": "Padi Tahan Banjir", "abstract": "Ringkasan", "year": "2023" })),
        )
        .unwrap();
        let value = serde_json::to_value(&research).unwrap();
        assert_eq!(value["abstract"], "Ringkasan");
        assert_eq!(value["year"], 2023);
    }

    #[test]
    fn agenda_sorts_upcoming_first_with_undated_last() {
        let mut items = vec![
            Agenda { date: None, ..Default::default() },
            Agenda { date: Some("2025-03-01".into()), ..Default::default() },
            Agenda { date: Some("2025-01-10".into()), ..Default::default() },
        ];
        Agenda::sort(&mut items);
        let dates: Vec<_> = items.iter().map(|a| a.date.as_deref()).collect();
        assert_eq!(dates, vec![Some("2025-01-10"), Some("2025-03-01"), None]);
    }
}
