use crate::errors::{AppError, ResultExt};
use crate::models::{ListingFilter, NewPerson, PersonPatch, PersonRecord};
use sqlx::{PgPool, Postgres, QueryBuilder};

const PERSON_COLUMNS: &str =
    "id, name, surname, patronymic, age, gender, nationality, created_at, updated_at";

/// Database storage for person records.
#[derive(Clone)]
pub struct PeopleStorage {
    pool: PgPool,
}

impl PeopleStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a person and return the stored row
    pub async fn create_person(&self, person: &NewPerson) -> Result<PersonRecord, AppError> {
        let record = sqlx::query_as::<_, PersonRecord>(&format!(
            r#"
            INSERT INTO people (name, surname, patronymic, age, gender, nationality)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PERSON_COLUMNS
        ))
        .bind(&person.name)
        .bind(&person.surname)
        .bind(&person.patronymic)
        .bind(person.age)
        .bind(&person.gender)
        .bind(&person.nationality)
        .fetch_one(&self.pool)
        .await
        .context("failed to create person")?;

        tracing::info!("Stored person {} (id: {})", record.name, record.id);
        Ok(record)
    }

    /// Overwrite every column of person `id`
    pub async fn update_full(&self, id: i32, person: &NewPerson) -> Result<PersonRecord, AppError> {
        let record = sqlx::query_as::<_, PersonRecord>(&format!(
            r#"
            UPDATE people
            SET name = $1,
                surname = $2,
                patronymic = $3,
                age = $4,
                gender = $5,
                nationality = $6,
                updated_at = now()
            WHERE id = $7
            RETURNING {}
            "#,
            PERSON_COLUMNS
        ))
        .bind(&person.name)
        .bind(&person.surname)
        .bind(&person.patronymic)
        .bind(person.age)
        .bind(&person.gender)
        .bind(&person.nationality)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to update person")?
        .ok_or_else(|| not_found(id))?;

        tracing::info!("Updated person {} (full)", id);
        Ok(record)
    }

    /// Write only the columns present in `patch`
    pub async fn update_partial(
        &self,
        id: i32,
        patch: &PersonPatch,
    ) -> Result<PersonRecord, AppError> {
        let mut query = patch_query(id, patch)
            .ok_or_else(|| AppError::BadRequest("no fields to update".to_string()))?;

        let record = query
            .build_query_as::<PersonRecord>()
            .fetch_optional(&self.pool)
            .await
            .context("failed to update person")?
            .ok_or_else(|| not_found(id))?;

        tracing::info!("Updated person {} (partial)", id);
        Ok(record)
    }

    /// Delete person `id`; a missing row is `NotFound`
    pub async fn delete_person(&self, id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM people WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to delete person")?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        tracing::info!("Deleted person {}", id);
        Ok(())
    }

    /// Current first name of person `id`
    pub async fn fetch_name(&self, id: i32) -> Result<String, AppError> {
        sqlx::query_scalar::<_, String>("SELECT name FROM people WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to get person")?
            .ok_or_else(|| not_found(id))
    }

    pub async fn fetch_person(&self, id: i32) -> Result<PersonRecord, AppError> {
        sqlx::query_as::<_, PersonRecord>(&format!(
            "SELECT {} FROM people WHERE id = $1",
            PERSON_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to get person")?
        .ok_or_else(|| not_found(id))
    }

    /// One page of people matching `filter`, plus the total match count.
    ///
    /// Both reads run in one repeatable-read snapshot so the count and the
    /// page agree with each other.
    pub async fn list_paged(
        &self,
        filter: &ListingFilter,
    ) -> Result<(Vec<PersonRecord>, i64), AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to start listing transaction")?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .context("failed to set listing isolation")?;

        let mut count = count_query(filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&mut *tx)
            .await
            .context("failed to count people")?;

        let mut page = page_query(filter);
        let people = page
            .build_query_as::<PersonRecord>()
            .fetch_all(&mut *tx)
            .await
            .context("failed to list people")?;

        tx.commit().await.context("failed to finish listing")?;

        tracing::debug!(
            "Listed {} of {} people (page {}, {} per page)",
            people.len(),
            total,
            filter.pagination.page,
            filter.pagination.entries
        );

        Ok((people, total))
    }
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("person with id {} does not exist", id))
}

/// Escapes LIKE wildcards so user input only ever matches literally.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_filters(query: &mut QueryBuilder<'static, Postgres>, filter: &ListingFilter) {
    let text_filters = [
        ("name", &filter.name),
        ("surname", &filter.surname),
        ("patronymic", &filter.patronymic),
        ("nationality", &filter.nationality),
        ("gender", &filter.gender),
    ];

    for (column, value) in text_filters {
        if let Some(value) = value {
            query.push(format!(" AND {} ILIKE ", column));
            query.push_bind(format!("%{}%", escape_like(value)));
        }
    }

    if let Some(age) = filter.age {
        query.push(" AND age = ");
        query.push_bind(age);
    }
}

/// `SELECT COUNT(*)` over the rows matching `filter`, ignoring paging.
pub fn count_query(filter: &ListingFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM people WHERE 1=1");
    push_filters(&mut query, filter);
    query
}

/// The requested page of rows matching `filter`, ordered by id.
pub fn page_query(filter: &ListingFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {} FROM people WHERE 1=1", PERSON_COLUMNS));
    push_filters(&mut query, filter);
    query.push(" ORDER BY id LIMIT ");
    query.push_bind(filter.pagination.entries);
    query.push(" OFFSET ");
    query.push_bind(filter.pagination.offset());
    query
}

/// `UPDATE` touching only the supplied columns, or `None` when nothing was
/// supplied. Empty gender/nationality clear the column.
pub fn patch_query(id: i32, patch: &PersonPatch) -> Option<QueryBuilder<'static, Postgres>> {
    if patch.is_empty() {
        return None;
    }

    let mut query = QueryBuilder::new("UPDATE people SET ");
    {
        let mut set = query.separated(", ");
        let names = [
            ("name", &patch.name),
            ("surname", &patch.surname),
            ("patronymic", &patch.patronymic),
        ];
        for (column, value) in names {
            if let Some(value) = value {
                set.push(format!("{} = ", column));
                set.push_bind_unseparated(value.trim().to_string());
            }
        }
        if let Some(age) = patch.age {
            set.push("age = ");
            set.push_bind_unseparated(age);
        }
        let optional = [("gender", &patch.gender), ("nationality", &patch.nationality)];
        for (column, value) in optional {
            if let Some(value) = value {
                let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                set.push(format!("{} = ", column));
                set.push_bind_unseparated(value);
            }
        }
        set.push("updated_at = now()");
    }
    query.push(" WHERE id = ");
    query.push_bind(id);
    query.push(format!(" RETURNING {}", PERSON_COLUMNS));

    Some(query)
}
