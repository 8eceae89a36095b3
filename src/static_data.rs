//! Compiled-in tables: tuition fees and the chatbot's built-in answers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TuitionFee {
    pub faculty: &'static str,
    pub program: &'static str,
    pub program_en: &'static str,
    pub degree: &'static str,
    /// All amounts in rupiah.
    pub registration_fee: u64,
    pub tuition_per_semester: u64,
    pub development_fee: u64,
}

macro_rules! fee {
    ($faculty:expr, $program:expr, $program_en:expr, $degree:expr, $reg:expr, $spp:expr, $dev:expr) => {
        TuitionFee {
            faculty: $faculty,
            program: $program,
            program_en: $program_en,
            degree: $degree,
            registration_fee: $reg,
            tuition_per_semester: $spp,
            development_fee: $dev,
        }
    };
}

pub const TUITION_FEES: &[TuitionFee] = &[
    fee!("fakultas-teknik", "Teknik Informatika", "Informatics Engineering", "S1", 350_000, 6_500_000, 7_500_000),
    fee!("fakultas-teknik", "Teknik Sipil", "Civil Engineering", "S1", 350_000, 6_000_000, 7_000_000),
    fee!("fakultas-teknik", "Teknik Elektro", "Electrical Engineering", "S1", 350_000, 6_000_000, 7_000_000),
    fee!("fakultas-teknik", "Sistem Informasi", "Information Systems", "S1", 350_000, 5_750_000, 6_500_000),
    fee!("fakultas-ekonomi-dan-bisnis", "Manajemen", "Management", "S1", 300_000, 5_500_000, 6_000_000),
    fee!("fakultas-ekonomi-dan-bisnis", "Akuntansi", "Accounting", "S1", 300_000, 5_500_000, 6_000_000),
    fee!("fakultas-ekonomi-dan-bisnis", "Akuntansi", "Accounting", "D3", 300_000, 4_500_000, 5_000_000),
    fee!("fakultas-ekonomi-dan-bisnis", "Magister Manajemen", "Master of Management", "S2", 500_000, 9_000_000, 10_000_000),
    fee!("fakultas-hukum", "Ilmu Hukum", "Law", "S1", 300_000, 5_250_000, 6_000_000),
    fee!("fakultas-hukum", "Magister Hukum", "Master of Law", "S2", 500_000, 8_500_000, 10_000_000),
    fee!("fakultas-keguruan-dan-ilmu-pendidikan", "Pendidikan Bahasa Inggris", "English Education", "S1", 300_000, 4_750_000, 5_000_000),
    fee!("fakultas-keguruan-dan-ilmu-pendidikan", "Pendidikan Matematika", "Mathematics Education", "S1", 300_000, 4_750_000, 5_000_000),
    fee!("fakultas-ilmu-kesehatan", "Keperawatan", "Nursing", "S1", 400_000, 7_500_000, 9_000_000),
    fee!("fakultas-ilmu-kesehatan", "Kebidanan", "Midwifery", "D3", 400_000, 6_500_000, 8_000_000),
];

/// Fees matching the optional faculty slug and degree, ordered by faculty then program.
pub fn find_tuition(faculty: Option<&str>, degree: Option<&str>) -> Vec<TuitionFee> {
    let faculty = faculty.map(str::trim).filter(|f| !f.is_empty());
    let degree = degree.map(str::trim).filter(|d| !d.is_empty());

    let mut fees: Vec<TuitionFee> = TUITION_FEES
        .iter()
        .filter(|f| faculty.map_or(true, |want| f.faculty.eq_ignore_ascii_case(want)))
        .filter(|f| degree.map_or(true, |want| f.degree.eq_ignore_ascii_case(want)))
        .copied()
        .collect();
    fees.sort_by(|a, b| {
        a.faculty
            .cmp(b.faculty)
            .then(a.program.cmp(b.program))
            .then(a.degree.cmp(b.degree))
    });
    fees
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaqEntry {
    pub keywords: Vec<String>,
    pub answer: String,
    pub answer_en: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Suggestion {
    pub text: String,
    pub text_en: Option<String>,
}

/// What the chat endpoint answers from. `chatbot.json` in the data directory
/// replaces the built-in set when it has entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatKnowledge {
    pub entries: Vec<FaqEntry>,
    pub suggestions: Vec<Suggestion>,
    pub fallback: String,
    pub fallback_en: Option<String>,
}

const BUILTIN_FAQ: &[(&[&str], &str, &str)] = &[
    (
        &["daftar", "pendaftaran", "pmb", "register", "registration", "admission"],
        "Pendaftaran mahasiswa baru dilakukan secara online melalui halaman PMB. Siapkan ijazah, rapor, dan pas foto.",
        "New student registration is done online through the admissions (PMB) page. Prepare your diploma, report cards and a photo.",
    ),
    (
        &["biaya", "ukt", "spp", "kuliah", "fee", "fees", "tuition", "cost"],
        "Rincian biaya kuliah per program studi tersedia di halaman Biaya Kuliah.",
        "Tuition details for each study program are listed on the Tuition page.",
    ),
    (
        &["beasiswa", "scholarship", "kip"],
        "Tersedia beasiswa prestasi, KIP Kuliah, dan beasiswa mitra. Lihat halaman Beasiswa untuk syarat dan tenggat.",
        "Merit scholarships, KIP Kuliah and partner scholarships are available. See the Scholarships page for requirements and deadlines.",
    ),
    (
        &["fakultas", "prodi", "jurusan", "program", "faculty", "major"],
        "Daftar fakultas dan program studi beserta akreditasinya ada di halaman Fakultas.",
        "The list of faculties and study programs with their accreditation is on the Faculties page.",
    ),
    (
        &["kalender", "jadwal", "semester", "calendar", "schedule"],
        "Jadwal perkuliahan dan ujian tercantum di Kalender Akademik.",
        "Lecture and exam dates are listed in the Academic Calendar.",
    ),
    (
        &["alamat", "lokasi", "kampus", "kontak", "address", "location", "contact"],
        "Silakan hubungi bagian humas melalui kontak di bagian bawah halaman atau kunjungi kampus pada hari kerja.",
        "Please reach the public relations office via the contacts at the bottom of the page or visit the campus on working days.",
    ),
];

const BUILTIN_SUGGESTIONS: &[(&str, &str)] = &[
    ("Bagaimana cara mendaftar?", "How do I register?"),
    ("Berapa biaya kuliah?", "How much is the tuition?"),
    ("Beasiswa apa saja yang tersedia?", "Which scholarships are available?"),
    ("Fakultas apa saja yang ada?", "Which faculties are there?"),
];

impl ChatKnowledge {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_FAQ
                .iter()
                .map(|(keywords, answer, answer_en)| FaqEntry {
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                    answer: answer.to_string(),
                    answer_en: Some(answer_en.to_string()),
                })
                .collect(),
            suggestions: BUILTIN_SUGGESTIONS
                .iter()
                .map(|(text, text_en)| Suggestion {
                    text: text.to_string(),
                    text_en: Some(text_en.to_string()),
                })
                .collect(),
            fallback: "Maaf, kami belum punya jawaban untuk pertanyaan itu. Silakan hubungi bagian humas kampus.".into(),
            fallback_en: Some(
                "Sorry, we don't have an answer for that yet. Please contact the campus public relations office.".into(),
            ),
        }
    }
}
