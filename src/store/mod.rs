//! Persistence for students, exams and scores.
//!
//! Composite reads are explicit joins. Deleting a student or an exam removes
//! its scores inside the same transaction.

pub mod exams;
pub mod scores;
pub mod students;
