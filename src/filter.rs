//! Predicate composition for the score listing and the student search.
//!
//! Filters are conjunctive and every substring match is unanchored and
//! case-sensitive (`strpos`), so `%` and `_` in user input carry no
//! pattern meaning. A key repeated in the query string keeps its first value.

use sqlx::{Postgres, QueryBuilder};

const SCORE_LISTING: &str = r#"
    SELECT sc.id, sc.student_id, st.name AS student_name, st.student_number,
           sc.exam_id, e.name AS exam_name, e.year AS exam_year,
           sc.points, sc.deviation_value, sc.judgment
    FROM scores sc
    JOIN exams e ON e.id = sc.exam_id
    JOIN students st ON st.id = sc.student_id"#;

#[derive(Debug, Clone, Default)]
pub struct ScoreFilter {
    pub year: Option<String>,
    pub exam_name: Option<String>,
}

impl ScoreFilter {
    pub fn from_query(raw: Option<&str>) -> Self {
        let pairs = FirstValues::parse(raw);
        Self {
            year: pairs.get("year"),
            exam_name: pairs.get("exam_name"),
        }
    }

    /// Values that don't parse as an integer impose no constraint.
    pub fn year(&self) -> Option<i32> {
        self.year.as_deref().and_then(|y| y.trim().parse().ok())
    }

    pub fn exam_name(&self) -> Option<&str> {
        non_empty(&self.exam_name)
    }

    pub fn query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(SCORE_LISTING);
        let mut clause = Clause::default();

        if let Some(year) = self.year() {
            clause.next(&mut qb).push("e.year = ").push_bind(year);
        }
        if let Some(name) = self.exam_name() {
            clause
                .next(&mut qb)
                .push("strpos(e.name, ")
                .push_bind(name.to_owned())
                .push(") > 0");
        }

        qb.push(" ORDER BY sc.id");
        qb
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentSearch {
    pub name: Option<String>,
    pub university: Option<String>,
    /// Accepted for compatibility with existing callers. There is no stored
    /// high school field, so it never narrows the result.
    pub high_school: Option<String>,
}

impl StudentSearch {
    pub fn from_query(raw: Option<&str>) -> Self {
        let pairs = FirstValues::parse(raw);
        Self {
            name: pairs.get("name"),
            university: pairs.get("university"),
            high_school: pairs.get("high_school"),
        }
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    pub fn university(&self) -> Option<&str> {
        non_empty(&self.university)
    }

    pub fn query(&self) -> QueryBuilder<'static, Postgres> {
        if let Some(high_school) = non_empty(&self.high_school) {
            log::debug!("ignoring high_school filter `{}`", high_school);
        }

        let mut qb = QueryBuilder::new("SELECT * FROM students");
        let mut clause = Clause::default();

        if let Some(university) = self.university() {
            clause
                .next(&mut qb)
                .push("strpos(first_choice_university, ")
                .push_bind(university.to_owned())
                .push(") > 0");
        }
        if let Some(name) = self.name() {
            clause
                .next(&mut qb)
                .push("strpos(name, ")
                .push_bind(name.to_owned())
                .push(") > 0");
        }

        qb.push(" ORDER BY id");
        qb
    }
}

struct FirstValues(Vec<(String, String)>);

impl FirstValues {
    // Form decoding is lossy, so a malformed query string decodes to something
    // rather than failing.
    fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .and_then(|query| serde_urlencoded::from_str::<Vec<(String, String)>>(query).ok())
            .unwrap_or_default();
        Self(pairs)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

/// Emits `WHERE` before the first condition and `AND` before the rest.
#[derive(Default)]
struct Clause {
    started: bool,
}

impl Clause {
    fn next<'q, 'args>(
        &mut self,
        qb: &'q mut QueryBuilder<'args, Postgres>,
    ) -> &'q mut QueryBuilder<'args, Postgres> {
        qb.push(if self.started { " AND " } else { " WHERE " });
        self.started = true;
        qb
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
