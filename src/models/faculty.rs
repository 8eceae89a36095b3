use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{error::ApiError, uploads::FormData, utils};

pub const FACULTY_COLUMNS: &str = "id, name, name_en, slug, icon, description, description_en, \
     advantages, advantages_en, career_prospects, career_prospects_en, sort_order";

pub const PROGRAM_COLUMNS: &str = "id, faculty_id, name, name_en, degree, accreditation, \
     description, description_en, sort_order";

#[derive(Debug, FromRow)]
pub struct FacultyRow {
    pub id: i64,
    pub name: String,
    pub name_en: Option<String>,
    pub slug: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub advantages: Option<String>,
    pub advantages_en: Option<String>,
    pub career_prospects: Option<String>,
    pub career_prospects_en: Option<String>,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub id: i64,
    pub name: String,
    pub name_en: Option<String>,
    pub slug: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub advantages: Vec<String>,
    pub advantages_en: Vec<String>,
    pub career_prospects: Vec<String>,
    pub career_prospects_en: Vec<String>,
    pub sort_order: i64,
    pub programs: Vec<FacultyProgram>,
}

impl From<FacultyRow> for Faculty {
    fn from(row: FacultyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            name_en: row.name_en,
            slug: row.slug,
            icon: row.icon,
            description: row.description,
            description_en: row.description_en,
            advantages: utils::decode_list(row.advantages.as_deref()),
            advantages_en: utils::decode_list(row.advantages_en.as_deref()),
            career_prospects: utils::decode_list(row.career_prospects.as_deref()),
            career_prospects_en: utils::decode_list(row.career_prospects_en.as_deref()),
            sort_order: row.sort_order,
            programs: Vec::new(),
        }
    }
}

impl Faculty {
    pub fn from_form(form: &FormData) -> Result<Self, ApiError> {
        let mut faculty = Self {
            name: form.required("name")?,
            ..Default::default()
        };
        faculty.merge(form)?;
        Ok(faculty)
    }

    /// `icon` may arrive as a plain icon name; uploaded icon files are applied by the handler.
    pub fn merge(&mut self, form: &FormData) -> Result<(), ApiError> {
        form.merge_text("name", &mut self.name);
        form.merge_opt("nameEn", &mut self.name_en);
        form.merge_opt("icon", &mut self.icon);
        form.merge_opt("description", &mut self.description);
        form.merge_opt("descriptionEn", &mut self.description_en);
        form.merge_list("advantages", &mut self.advantages);
        form.merge_list("advantagesEn", &mut self.advantages_en);
        form.merge_list("careerProspects", &mut self.career_prospects);
        form.merge_list("careerProspectsEn", &mut self.career_prospects_en);
        if let Some(order) = form.int("sortOrder")? {
            self.sort_order = order;
        }
        if self.name.is_empty() {
            return Err(ApiError::bad_request("name wajib diisi"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FacultyProgram {
    pub id: i64,
    pub faculty_id: i64,
    pub name: String,
    pub name_en: Option<String>,
    pub degree: Option<String>,
    pub accreditation: Option<String>,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub sort_order: i64,
}

impl FacultyProgram {
    pub fn from_form(faculty_id: i64, form: &FormData) -> Result<Self, ApiError> {
        let mut program = Self {
            faculty_id,
            name: form.required("name")?,
            ..Default::default()
        };
        program.merge(form)?;
        Ok(program)
    }

    pub fn merge(&mut self, form: &FormData) -> Result<(), ApiError> {
        form.merge_text("name", &mut self.name);
        form.merge_opt("nameEn", &mut self.name_en);
        form.merge_opt("degree", &mut self.degree);
        form.merge_opt("accreditation", &mut self.accreditation);
        form.merge_opt("description", &mut self.description);
        form.merge_opt("descriptionEn", &mut self.description_en);
        if let Some(order) = form.int("sortOrder")? {
            self.sort_order = order;
        }
        if self.name.is_empty() {
            return Err(ApiError::bad_request("name wajib diisi"));
        }
        Ok(())
    }
}

/// Attaches programs to their faculties, keeping the programs' order.
pub fn attach_programs(faculties: &mut [Faculty], programs: Vec<FacultyProgram>) {
    for program in programs {
        if let Some(faculty) = faculties.iter_mut().find(|f| f.id == program.faculty_id) {
            faculty.programs.push(program);
        }
    }
}
