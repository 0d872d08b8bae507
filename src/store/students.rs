use sqlx::PgPool;

use crate::err::Error;
use crate::filter::StudentSearch;
use crate::models::{NewStudent, Student, StudentDetail, StudentPatch, StudentScore};

fn missing(id: i32) -> Error {
    Error::not_found(format!("Student `{}` does not exist", id))
}

fn taken(student_number: &str) -> impl FnOnce(sqlx::Error) -> Error + '_ {
    move |err| match Error::from(err) {
        Error::ConstraintViolation { .. } => Error::ConstraintViolation {
            message: format!("Student number `{}` is already registered", student_number),
        },
        other => other,
    }
}

pub async fn insert(pg: &PgPool, student: NewStudent) -> Result<Student, Error> {
    let number = student.student_number.clone();
    let created = sqlx::query_as::<_, Student>(
        "INSERT INTO students (student_number, grade, name, first_choice_university, first_choice_department) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(student.student_number)
    .bind(student.grade)
    .bind(student.name)
    .bind(student.first_choice_university)
    .bind(student.first_choice_department)
    .fetch_one(pg)
    .await
    .map_err(taken(&number))?;

    Ok(created)
}

pub async fn all(pg: &PgPool) -> Result<Vec<Student>, Error> {
    let students = sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY id")
        .fetch_all(pg)
        .await?;
    Ok(students)
}

pub async fn find(pg: &PgPool, id: i32) -> Result<Option<Student>, Error> {
    let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
        .bind(id)
        .fetch_optional(pg)
        .await?;
    Ok(student)
}

/// Loads a student together with every score, each joined to its exam.
pub async fn detail(pg: &PgPool, id: i32) -> Result<StudentDetail, Error> {
    let student = find(pg, id).await?.ok_or_else(|| missing(id))?;

    let scores = sqlx::query_as::<_, StudentScore>(
        r#"
        SELECT sc.id, sc.exam_id, e.name AS exam_name, e.year AS exam_year,
               sc.points, sc.deviation_value, sc.judgment
        FROM scores sc
        JOIN exams e ON e.id = sc.exam_id
        WHERE sc.student_id = $1
        ORDER BY sc.id
        "#,
    )
    .bind(id)
    .fetch_all(pg)
    .await?;

    Ok(StudentDetail { student, scores })
}

pub async fn update(pg: &PgPool, id: i32, patch: StudentPatch) -> Result<Student, Error> {
    let mut tx = pg.begin().await?;

    let mut student =
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut tx)
            .await?
            .ok_or_else(|| missing(id))?;

    patch.validate()?;
    patch.apply(&mut student);

    let updated = sqlx::query_as::<_, Student>(
        r#"
        UPDATE students
        SET student_number = $2, grade = $3, name = $4,
            first_choice_university = $5, first_choice_department = $6
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&student.student_number)
    .bind(student.grade)
    .bind(&student.name)
    .bind(&student.first_choice_university)
    .bind(&student.first_choice_department)
    .fetch_one(&mut tx)
    .await
    .map_err(taken(&student.student_number))?;

    tx.commit().await?;
    Ok(updated)
}

/// Deletes a student and its scores atomically, returning how many scores
/// went with it.
pub async fn delete(pg: &PgPool, id: i32) -> Result<u64, Error> {
    let mut tx = pg.begin().await?;

    // The row lock keeps new scores from referencing the student mid-delete.
    sqlx::query("SELECT id FROM students WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut tx)
        .await?
        .ok_or_else(|| missing(id))?;

    let scores = sqlx::query("DELETE FROM scores WHERE student_id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM students WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;

    tx.commit().await?;
    log::info!("Deleted student {} with {} scores", id, scores);
    Ok(scores)
}

pub async fn search(pg: &PgPool, search: &StudentSearch) -> Result<Vec<Student>, Error> {
    let students = search
        .query()
        .build_query_as::<Student>()
        .fetch_all(pg)
        .await?;
    Ok(students)
}
