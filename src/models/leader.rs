use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{error::ApiError, uploads::FormData, utils};

pub const LEADER_COLUMNS: &str = "id, slug, name, title, title_en, category, education, career, \
     research, bio, bio_en, image, sort_order";

/// Known leadership tiers, in display order. Any other label sorts after them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LeaderCategory {
    Rektor,
    WakilRektor,
    Dekan,
    Lainnya,
}

impl LeaderCategory {
    pub fn from_label(label: &str) -> Self {
        let normalized = label
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        match normalized.as_str() {
            "rektor" => LeaderCategory::Rektor,
            "wakil rektor" | "wakil-rektor" => LeaderCategory::WakilRektor,
            "dekan" => LeaderCategory::Dekan,
            _ => LeaderCategory::Lainnya,
        }
    }

    pub fn label(&self) -> Option<&'static str> {
        match self {
            LeaderCategory::Rektor => Some("Rektor"),
            LeaderCategory::WakilRektor => Some("Wakil Rektor"),
            LeaderCategory::Dekan => Some("Dekan"),
            LeaderCategory::Lainnya => None,
        }
    }
}

/// Known categories are stored with their canonical spelling; free labels as given.
pub fn canonical_category(raw: &str) -> String {
    LeaderCategory::from_label(raw)
        .label()
        .map(str::to_string)
        .unwrap_or_else(|| raw.trim().to_string())
}

#[derive(Debug, FromRow)]
pub struct LeaderRow {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub title: Option<String>,
    pub title_en: Option<String>,
    pub category: String,
    pub education: Option<String>,
    pub career: Option<String>,
    pub research: Option<String>,
    pub bio: Option<String>,
    pub bio_en: Option<String>,
    pub image: Option<String>,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leader {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub title: Option<String>,
    pub title_en: Option<String>,
    pub category: String,
    pub education: Vec<String>,
    pub career: Vec<String>,
    pub research: Vec<String>,
    pub bio: Option<String>,
    pub bio_en: Option<String>,
    pub image: Option<String>,
    pub sort_order: i64,
}

impl From<LeaderRow> for Leader {
    fn from(row: LeaderRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            title: row.title,
            title_en: row.title_en,
            category: row.category,
            education: utils::decode_list(row.education.as_deref()),
            career: utils::decode_list(row.career.as_deref()),
            research: utils::decode_list(row.research.as_deref()),
            bio: row.bio,
            bio_en: row.bio_en,
            image: row.image,
            sort_order: row.sort_order,
        }
    }
}

impl Leader {
    pub fn from_form(form: &FormData) -> Result<Self, ApiError> {
        let mut leader = Self {
            name: form.required("name")?,
            category: form.required("category")?,
            ..Default::default()
        };
        leader.merge(form)?;
        Ok(leader)
    }

    pub fn merge(&mut self, form: &FormData) -> Result<(), ApiError> {
        form.merge_text("name", &mut self.name);
        form.merge_opt("title", &mut self.title);
        form.merge_opt("titleEn", &mut self.title_en);
        if let Some(category) = form.opt("category") {
            self.category = canonical_category(&category);
        }
        form.merge_list("education", &mut self.education);
        form.merge_list("career", &mut self.career);
        form.merge_list("research", &mut self.research);
        form.merge_opt("bio", &mut self.bio);
        form.merge_opt("bioEn", &mut self.bio_en);
        if let Some(order) = form.int("sortOrder")? {
            self.sort_order = order;
        }
        if self.name.is_empty() {
            return Err(ApiError::bad_request("name wajib diisi"));
        }
        Ok(())
    }

    pub fn rank(&self) -> LeaderCategory {
        LeaderCategory::from_label(&self.category)
    }
}

/// Rektor, Wakil Rektor, Dekan, then everyone else; `sortOrder` then id within a tier.
pub fn sort_leaders(leaders: &mut [Leader]) {
    leaders.sort_by(|a, b| {
        a.rank()
            .cmp(&b.rank())
            .then(a.sort_order.cmp(&b.sort_order))
            .then(a.id.cmp(&b.id))
    });
}
