use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::db::{self, DbError, Executed};
use crate::students::repo_types::{Student, StudentFields};

#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn ping(&self) -> Result<bool, DbError>;
    /// All rows by ascending id, or only those whose `full_name` contains `search`.
    async fn list(&self, search: Option<&str>) -> Result<Vec<Student>, DbError>;
    async fn find(&self, id: i64) -> Result<Option<Student>, DbError>;
    async fn insert(&self, fields: &StudentFields) -> Result<Executed, DbError>;
    async fn update(&self, id: i64, fields: &StudentFields) -> Result<Executed, DbError>;
    async fn delete(&self, id: i64) -> Result<Executed, DbError>;
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, student_code, full_name, email,
           DATE_FORMAT(dob, '%Y-%m-%d') AS dob,
           class_name, created_at, updated_at
    FROM students
"#;

#[derive(Clone)]
pub struct MySqlStudentStore {
    db: MySqlPool,
}

impl MySqlStudentStore {
    pub fn new(db: MySqlPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StudentStore for MySqlStudentStore {
    async fn ping(&self) -> Result<bool, DbError> {
        db::ping(&self.db).await
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<Student>, DbError> {
        let rows = match search {
            Some(q) => {
                let sql = format!("{SELECT_COLUMNS} WHERE full_name LIKE ? ORDER BY id ASC");
                sqlx::query_as::<_, Student>(&sql)
                    .bind(format!("%{}%", escape_like(q)))
                    .fetch_all(&self.db)
                    .await?
            }
            None => {
                let sql = format!("{SELECT_COLUMNS} ORDER BY id ASC");
                sqlx::query_as::<_, Student>(&sql).fetch_all(&self.db).await?
            }
        };
        Ok(rows)
    }

    async fn find(&self, id: i64) -> Result<Option<Student>, DbError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn insert(&self, fields: &StudentFields) -> Result<Executed, DbError> {
        let res = sqlx::query(
            r#"
            INSERT INTO students (student_code, full_name, email, dob, class_name)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&fields.student_code)
        .bind(&fields.full_name)
        .bind(&fields.email)
        .bind(&fields.dob)
        .bind(&fields.class_name)
        .execute(&self.db)
        .await?;
        Ok(res.into())
    }

    async fn update(&self, id: i64, fields: &StudentFields) -> Result<Executed, DbError> {
        let res = sqlx::query(
            r#"
            UPDATE students
            SET student_code = ?, full_name = ?, email = ?, dob = ?, class_name = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.student_code)
        .bind(&fields.full_name)
        .bind(&fields.email)
        .bind(&fields.dob)
        .bind(&fields.class_name)
        .bind(id)
        .execute(&self.db)
        .await?;
        Ok(res.into())
    }

    async fn delete(&self, id: i64) -> Result<Executed, DbError> {
        let res = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.into())
    }
}

/// Escapes LIKE wildcards so the pattern matches `q` literally.
pub fn escape_like(q: &str) -> String {
    let mut out = String::with_capacity(q.len());
    for c in q.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
pub mod memory {
    use std::sync::Mutex;

    use time::OffsetDateTime;

    use super::*;

    /// In-process stand-in for the students table, unique on `student_code`.
    #[derive(Default)]
    pub struct MemoryStudentStore {
        rows: Mutex<Vec<Student>>,
        next_id: Mutex<i64>,
        pub healthy: bool,
    }

    impl MemoryStudentStore {
        pub fn new() -> Self {
            Self {
                healthy: true,
                ..Self::default()
            }
        }

        pub fn broken() -> Self {
            Self::default()
        }

        fn ensure_up(&self) -> Result<(), DbError> {
            if self.healthy {
                Ok(())
            } else {
                Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
            }
        }

        fn check_unique(rows: &[Student], code: &str, skip_id: Option<i64>) -> Result<(), DbError> {
            let taken = rows
                .iter()
                .any(|s| s.student_code == code && Some(s.id) != skip_id);
            if taken {
                return Err(DbError::UniqueViolation(format!(
                    "Duplicate entry '{code}' for key 'uq_student_code'"
                )));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl StudentStore for MemoryStudentStore {
        async fn ping(&self) -> Result<bool, DbError> {
            self.ensure_up()?;
            Ok(true)
        }

        async fn list(&self, search: Option<&str>) -> Result<Vec<Student>, DbError> {
            self.ensure_up()?;
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|s| search.map_or(true, |q| s.full_name.contains(q)))
                .cloned()
                .collect())
        }

        async fn find(&self, id: i64) -> Result<Option<Student>, DbError> {
            self.ensure_up()?;
            Ok(self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned())
        }

        async fn insert(&self, fields: &StudentFields) -> Result<Executed, DbError> {
            self.ensure_up()?;
            let mut rows = self.rows.lock().unwrap();
            Self::check_unique(&rows, &fields.student_code, None)?;
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let now = OffsetDateTime::now_utc();
            rows.push(Student {
                id: *next_id,
                student_code: fields.student_code.clone(),
                full_name: fields.full_name.clone(),
                email: fields.email.clone(),
                dob: fields.dob.clone(),
                class_name: fields.class_name.clone(),
                created_at: now,
                updated_at: now,
            });
            Ok(Executed {
                insert_id: *next_id as u64,
                affected_rows: 1,
            })
        }

        async fn update(&self, id: i64, fields: &StudentFields) -> Result<Executed, DbError> {
            self.ensure_up()?;
            let mut rows = self.rows.lock().unwrap();
            if !rows.iter().any(|s| s.id == id) {
                return Ok(Executed::default());
            }
            Self::check_unique(&rows, &fields.student_code, Some(id))?;
            let Some(row) = rows.iter_mut().find(|s| s.id == id) else {
                return Ok(Executed::default());
            };
            row.student_code = fields.student_code.clone();
            row.full_name = fields.full_name.clone();
            row.email = fields.email.clone();
            row.dob = fields.dob.clone();
            row.class_name = fields.class_name.clone();
            row.updated_at = OffsetDateTime::now_utc();
            Ok(Executed {
                insert_id: 0,
                affected_rows: 1,
            })
        }

        async fn delete(&self, id: i64) -> Result<Executed, DbError> {
            self.ensure_up()?;
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|s| s.id != id);
            Ok(Executed {
                insert_id: 0,
                affected_rows: (before - rows.len()) as u64,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_leaves_plain_text_alone() {
        assert_eq!(escape_like("Anna"), "Anna");
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off"), r"50\%\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
    }
}
