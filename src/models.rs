use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::err::Error;

pub const STUDENT_NUMBER_MAX: usize = 50;
pub const STUDENT_NAME_MAX: usize = 100;
pub const CHOICE_MAX: usize = 200;
pub const EXAM_NAME_MAX: usize = 200;
pub const JUDGMENT_MAX: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: i32,
    pub student_number: String,
    pub grade: i32,
    pub name: String,
    pub first_choice_university: Option<String>,
    pub first_choice_department: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A score row joined with the exam it was taken in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentScore {
    pub id: i32,
    pub exam_id: i32,
    pub exam_name: String,
    pub exam_year: i32,
    pub points: Option<i32>,
    pub deviation_value: Option<f64>,
    pub judgment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentDetail {
    #[serde(flatten)]
    pub student: Student,
    pub scores: Vec<StudentScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Exam {
    pub id: i32,
    pub name: String,
    pub year: i32,
    pub exam_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Score {
    pub id: i32,
    pub student_id: i32,
    pub exam_id: i32,
    pub points: Option<i32>,
    pub deviation_value: Option<f64>,
    pub judgment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A score row joined with both its student and its exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScoreListing {
    pub id: i32,
    pub student_id: i32,
    pub student_name: String,
    pub student_number: String,
    pub exam_id: i32,
    pub exam_name: String,
    pub exam_year: i32,
    pub points: Option<i32>,
    pub deviation_value: Option<f64>,
    pub judgment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateStudent {
    pub student_number: Option<String>,
    pub grade: Option<i32>,
    pub name: Option<String>,
    pub first_choice_university: Option<String>,
    pub first_choice_department: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub student_number: String,
    pub grade: i32,
    pub name: String,
    pub first_choice_university: Option<String>,
    pub first_choice_department: Option<String>,
}

impl CreateStudent {
    pub fn validate(self) -> Result<NewStudent, Error> {
        let student_number = required_text("student_number", self.student_number)?;
        let name = required_text("name", self.name)?;
        let grade = required("grade", self.grade)?;
        check_len("student_number", &student_number, STUDENT_NUMBER_MAX)?;
        check_len("name", &name, STUDENT_NAME_MAX)?;
        check_opt_len(
            "first_choice_university",
            &self.first_choice_university,
            CHOICE_MAX,
        )?;
        check_opt_len(
            "first_choice_department",
            &self.first_choice_department,
            CHOICE_MAX,
        )?;

        Ok(NewStudent {
            student_number,
            grade,
            name,
            first_choice_university: self.first_choice_university,
            first_choice_department: self.first_choice_department,
        })
    }
}

/// Partial student update. Absent fields keep their current value; the
/// nullable choice fields are cleared by an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentPatch {
    pub student_number: Option<String>,
    pub grade: Option<i32>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub first_choice_university: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub first_choice_department: Option<Option<String>>,
}

impl StudentPatch {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(number) = &self.student_number {
            not_blank("student_number", number)?;
            check_len("student_number", number, STUDENT_NUMBER_MAX)?;
        }
        if let Some(name) = &self.name {
            not_blank("name", name)?;
            check_len("name", name, STUDENT_NAME_MAX)?;
        }
        if let Some(university) = &self.first_choice_university {
            check_opt_len("first_choice_university", university, CHOICE_MAX)?;
        }
        if let Some(department) = &self.first_choice_department {
            check_opt_len("first_choice_department", department, CHOICE_MAX)?;
        }
        Ok(())
    }

    pub fn apply(self, student: &mut Student) {
        if let Some(number) = self.student_number {
            student.student_number = number;
        }
        if let Some(grade) = self.grade {
            student.grade = grade;
        }
        if let Some(name) = self.name {
            student.name = name;
        }
        if let Some(university) = self.first_choice_university {
            student.first_choice_university = university;
        }
        if let Some(department) = self.first_choice_department {
            student.first_choice_department = department;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateExam {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub exam_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExam {
    pub name: String,
    pub year: i32,
    pub exam_date: Option<NaiveDate>,
}

impl CreateExam {
    pub fn validate(self) -> Result<NewExam, Error> {
        let name = required_text("name", self.name)?;
        check_len("name", &name, EXAM_NAME_MAX)?;
        let year = required("year", self.year)?;
        let exam_date = match self.exam_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(date) => Some(NaiveDate::parse_from_str(date, "%Y-%m-%d")?),
        };

        Ok(NewExam {
            name,
            year,
            exam_date,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateScore {
    pub student_id: Option<i32>,
    pub exam_id: Option<i32>,
    pub points: Option<i32>,
    pub deviation_value: Option<f64>,
    pub judgment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewScore {
    pub student_id: i32,
    pub exam_id: i32,
    pub points: Option<i32>,
    pub deviation_value: Option<f64>,
    pub judgment: Option<String>,
}

impl CreateScore {
    pub fn validate(self) -> Result<NewScore, Error> {
        let student_id = required("student_id", self.student_id)?;
        let exam_id = required("exam_id", self.exam_id)?;
        check_opt_len("judgment", &self.judgment, JUDGMENT_MAX)?;

        Ok(NewScore {
            student_id,
            exam_id,
            points: self.points,
            deviation_value: self.deviation_value,
            judgment: self.judgment,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportScores {
    #[serde(default)]
    pub scores: Vec<CreateScore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
    pub index: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub message: String,
    pub imported: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ImportFailure>,
}

impl ImportSummary {
    pub fn new(imported: usize, failures: Vec<ImportFailure>) -> Self {
        Self {
            message: format!("{} scores imported successfully", imported),
            imported,
            failures,
        }
    }
}

// Distinguishes an explicit `null` from an absent key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, Error> {
    value.ok_or_else(|| Error::validation(format!("`{}` is required", field)))
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, Error> {
    let value = required(field, value)?;
    not_blank(field, &value)?;
    Ok(value)
}

fn not_blank(field: &'static str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("`{}` cannot be empty", field)));
    }
    Ok(())
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), Error> {
    if value.chars().count() > max {
        return Err(Error::validation(format!(
            "`{}` exceeds maximum length of {} characters",
            field, max
        )));
    }
    Ok(())
}

fn check_opt_len(field: &'static str, value: &Option<String>, max: usize) -> Result<(), Error> {
    match value {
        Some(value) => check_len(field, value, max),
        None => Ok(()),
    }
}
