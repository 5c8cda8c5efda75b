pub mod doctor;
pub mod usage;
