pub mod archive;
pub mod exams;
