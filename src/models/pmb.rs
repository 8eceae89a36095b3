use serde::{Deserialize, Serialize};

use crate::{error::ApiError, models::content::parse_date, uploads::FormData};

pub const PMB_DOCUMENT: &str = "pmb";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PmbWave {
    pub name: String,
    pub name_en: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Admissions (PMB) settings shown on the registration page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PmbConfig {
    pub is_open: bool,
    pub academic_year: Option<String>,
    pub registration_url: Option<String>,
    pub announcement: Option<String>,
    pub announcement_en: Option<String>,
    pub contact_whatsapp: Option<String>,
    pub brochure: Option<String>,
    pub waves: Vec<PmbWave>,
    pub updated_at: Option<String>,
}

impl PmbConfig {
    pub fn merge(&mut self, form: &FormData) -> Result<(), ApiError> {
        if let Some(open) = form.bool("isOpen") {
            self.is_open = open;
        }
        form.merge_opt("academicYear", &mut self.academic_year);
        form.merge_opt("registrationUrl", &mut self.registration_url);
        form.merge_opt("announcement", &mut self.announcement);
        form.merge_opt("announcementEn", &mut self.announcement_en);
        form.merge_opt("contactWhatsapp", &mut self.contact_whatsapp);

        if let Some(waves) = form.json::<Vec<PmbWave>>("waves")? {
            self.waves = validate_waves(waves)?;
        }
        Ok(())
    }

    /// Wave whose date range contains `today` (YYYY-MM-DD), if registration is open.
    pub fn active_wave(&self, today: &str) -> Option<&PmbWave> {
        if !self.is_open {
            return None;
        }
        self.waves.iter().find(|w| {
            let started = w.start_date.as_deref().map_or(true, |s| s <= today);
            let not_ended = w.end_date.as_deref().map_or(true, |e| today <= e);
            started && not_ended
        })
    }
}

fn validate_waves(waves: Vec<PmbWave>) -> Result<Vec<PmbWave>, ApiError> {
    waves
        .into_iter()
        .map(|wave| {
            if wave.name.trim().is_empty() {
                return Err(ApiError::bad_request("Nama gelombang wajib diisi"));
            }
            let start_date = wave
                .start_date
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .map(|d| parse_date("startDate", d))
                .transpose()?;
            let end_date = wave
                .end_date
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .map(|d| parse_date("endDate", d))
                .transpose()?;
            Ok(PmbWave {
                name: wave.name.trim().to_string(),
                name_en: wave.name_en.filter(|n| !n.trim().is_empty()),
                start_date,
                end_date,
            })
        })
        .collect()
}
