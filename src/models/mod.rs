pub mod academic;
pub mod content;
pub mod faculty;
pub mod leader;
pub mod pmb;
