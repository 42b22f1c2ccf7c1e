//! `PostgreSQL` implementation of the store contracts.

use book_review_core::store::StoreFuture;
use book_review_core::{
    Book, BookId, BookRepository, HealthProbe, RatingSummary, Review, ReviewId, ReviewRepository,
    Session, SessionStore, StoreError, User, UserId, UserRepository,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const BOOK_COLUMNS: &str = "id, title, author, genre, publication_year, description, \
                            average_rating, num_reviews, added_by, created_at";
const REVIEW_COLUMNS: &str = "id, user_id, book_id, rating, comment, created_at";
const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    author: String,
    genre: Option<String>,
    publication_year: Option<i32>,
    description: Option<String>,
    average_rating: f64,
    num_reviews: i64,
    added_by: Uuid,
    created_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: BookId(row.id),
            title: row.title,
            author: row.author,
            genre: row.genre,
            publication_year: row.publication_year,
            description: row.description,
            average_rating: row.average_rating,
            num_reviews: row.num_reviews,
            added_by: UserId(row.added_by),
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    user_id: Uuid,
    book_id: Uuid,
    rating: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId(row.id),
            user: UserId(row.user_id),
            book: BookId(row.book_id),
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    token_hash: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            token_hash: row.token_hash,
            user_id: UserId(row.user_id),
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// Translate a sqlx error into the store taxonomy.
///
/// Unique violations keep their constraint name. A foreign key violation
/// means the referenced row is gone.
fn store_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StoreError::UniqueViolation {
                constraint: db_err.constraint().unwrap_or("unknown").to_string(),
            };
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::NotFound;
        }
    }
    StoreError::Database(e.to_string())
}

fn require_row(rows_affected: u64) -> Result<(), StoreError> {
    if rows_affected == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

/// `PostgreSQL` store for users, sessions, books and reviews.
///
/// # Example
///
/// ```no_run
/// use book_review_postgres::PostgresStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = sqlx::PgPool::connect("postgres://localhost/book_review").await?;
/// let store = PostgresStore::new(pool);
/// store.migrate().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns error if a migration fails or was modified after being applied.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

impl BookRepository for PostgresStore {
    fn insert_book<'a>(&'a self, book: &'a Book) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query(
                r"
                INSERT INTO books
                    (id, title, author, genre, publication_year, description,
                     average_rating, num_reviews, added_by, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ",
            )
            .bind(book.id.as_uuid())
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.genre)
            .bind(book.publication_year)
            .bind(&book.description)
            .bind(book.average_rating)
            .bind(book.num_reviews)
            .bind(book.added_by.as_uuid())
            .bind(book.created_at)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
            Ok(())
        })
    }

    fn find_book(&self, id: BookId) -> StoreFuture<'_, Option<Book>> {
        Box::pin(async move {
            let row: Option<BookRow> =
                sqlx::query_as(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"))
                    .bind(id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(store_error)?;
            Ok(row.map(Book::from))
        })
    }

    fn find_book_by_title_author<'a>(
        &'a self,
        title: &'a str,
        author: &'a str,
    ) -> StoreFuture<'a, Option<Book>> {
        Box::pin(async move {
            let row: Option<BookRow> = sqlx::query_as(&format!(
                "SELECT {BOOK_COLUMNS} FROM books WHERE title = $1 AND author = $2"
            ))
            .bind(title)
            .bind(author)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
            Ok(row.map(Book::from))
        })
    }

    fn list_books(&self) -> StoreFuture<'_, Vec<Book>> {
        Box::pin(async move {
            let rows: Vec<BookRow> = sqlx::query_as(&format!(
                "SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at DESC, title"
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
            Ok(rows.into_iter().map(Book::from).collect())
        })
    }

    fn search_candidates<'a>(&'a self, like_pattern: &'a str) -> StoreFuture<'a, Vec<Book>> {
        Box::pin(async move {
            let rows: Vec<BookRow> = sqlx::query_as(&format!(
                r"
                SELECT {BOOK_COLUMNS} FROM books
                WHERE title ILIKE $1 ESCAPE '\' OR author ILIKE $1 ESCAPE '\'
                ORDER BY created_at DESC, title
                "
            ))
            .bind(like_pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
            Ok(rows.into_iter().map(Book::from).collect())
        })
    }

    fn update_book<'a>(&'a self, book: &'a Book) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                UPDATE books
                SET title = $2,
                    author = $3,
                    genre = $4,
                    publication_year = $5,
                    description = $6
                WHERE id = $1
                ",
            )
            .bind(book.id.as_uuid())
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.genre)
            .bind(book.publication_year)
            .bind(&book.description)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
            require_row(result.rows_affected())
        })
    }

    fn delete_book_cascade(&self, id: BookId) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await.map_err(store_error)?;

            let reviews = sqlx::query("DELETE FROM reviews WHERE book_id = $1")
                .bind(id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(store_error)?
                .rows_affected();

            let books = sqlx::query("DELETE FROM books WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(store_error)?
                .rows_affected();

            if books == 0 {
                tx.rollback().await.map_err(store_error)?;
                return Err(StoreError::NotFound);
            }

            tx.commit().await.map_err(store_error)?;
            Ok(reviews)
        })
    }
}

impl ReviewRepository for PostgresStore {
    fn insert_review<'a>(&'a self, review: &'a Review) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query(
                r"
                INSERT INTO reviews (id, user_id, book_id, rating, comment, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(review.id.as_uuid())
            .bind(review.user.as_uuid())
            .bind(review.book.as_uuid())
            .bind(review.rating)
            .bind(&review.comment)
            .bind(review.created_at)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
            Ok(())
        })
    }

    fn find_review(&self, id: ReviewId) -> StoreFuture<'_, Option<Review>> {
        Box::pin(async move {
            let row: Option<ReviewRow> =
                sqlx::query_as(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
                    .bind(id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(store_error)?;
            Ok(row.map(Review::from))
        })
    }

    fn find_review_by_user_and_book(
        &self,
        user: UserId,
        book: BookId,
    ) -> StoreFuture<'_, Option<Review>> {
        Box::pin(async move {
            let row: Option<ReviewRow> = sqlx::query_as(&format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = $1 AND book_id = $2"
            ))
            .bind(user.as_uuid())
            .bind(book.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
            Ok(row.map(Review::from))
        })
    }

    fn list_reviews_for_book(&self, book: BookId) -> StoreFuture<'_, Vec<Review>> {
        Box::pin(async move {
            let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews WHERE book_id = $1 ORDER BY created_at, id"
            ))
            .bind(book.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
            Ok(rows.into_iter().map(Review::from).collect())
        })
    }

    fn update_review<'a>(&'a self, review: &'a Review) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let result = sqlx::query("UPDATE reviews SET rating = $2, comment = $3 WHERE id = $1")
                .bind(review.id.as_uuid())
                .bind(review.rating)
                .bind(&review.comment)
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
            require_row(result.rows_affected())
        })
    }

    fn delete_review(&self, id: ReviewId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
            require_row(result.rows_affected())
        })
    }

    fn refresh_rating_summary(&self, book: BookId) -> StoreFuture<'_, Option<RatingSummary>> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await.map_err(store_error)?;

            // Serializes refreshes of the same book; the scan below runs
            // after the lock is held, so it sees every committed review.
            let locked: Option<(Uuid,)> =
                sqlx::query_as("SELECT id FROM books WHERE id = $1 FOR UPDATE")
                    .bind(book.as_uuid())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(store_error)?;
            if locked.is_none() {
                tx.rollback().await.map_err(store_error)?;
                return Ok(None);
            }

            let ratings: Vec<i16> = sqlx::query_scalar("SELECT rating FROM reviews WHERE book_id = $1")
                .bind(book.as_uuid())
                .fetch_all(&mut *tx)
                .await
                .map_err(store_error)?;
            let summary = RatingSummary::from_ratings(&ratings);

            sqlx::query("UPDATE books SET average_rating = $2, num_reviews = $3 WHERE id = $1")
                .bind(book.as_uuid())
                .bind(summary.average_rating)
                .bind(summary.num_reviews)
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;

            tx.commit().await.map_err(store_error)?;
            Ok(Some(summary))
        })
    }
}

impl UserRepository for PostgresStore {
    fn insert_user<'a>(&'a self, user: &'a User) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query(
                r"
                INSERT INTO users (id, username, email, password_hash, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(user.id.as_uuid())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
            Ok(())
        })
    }

    fn find_user(&self, id: UserId) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move {
            let row: Option<UserRow> =
                sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                    .bind(id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(store_error)?;
            Ok(row.map(User::from))
        })
    }

    fn find_user_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Option<User>> {
        Box::pin(async move {
            let row: Option<UserRow> =
                sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                    .bind(email)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(store_error)?;
            Ok(row.map(User::from))
        })
    }

    fn find_user_by_username_or_email<'a>(
        &'a self,
        username: &'a str,
        email: &'a str,
    ) -> StoreFuture<'a, Option<User>> {
        Box::pin(async move {
            let row: Option<UserRow> = sqlx::query_as(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2 LIMIT 1"
            ))
            .bind(username)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
            Ok(row.map(User::from))
        })
    }

    fn find_users<'a>(&'a self, ids: &'a [UserId]) -> StoreFuture<'a, Vec<User>> {
        Box::pin(async move {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            let ids: Vec<Uuid> = ids.iter().map(UserId::as_uuid).collect();
            let rows: Vec<UserRow> =
                sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"))
                    .bind(&ids)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(store_error)?;
            Ok(rows.into_iter().map(User::from).collect())
        })
    }
}

impl SessionStore for PostgresStore {
    fn insert_session<'a>(&'a self, session: &'a Session) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query(
                r"
                INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(&session.token_hash)
            .bind(session.user_id.as_uuid())
            .bind(session.created_at)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
            Ok(())
        })
    }

    fn find_session<'a>(&'a self, token_hash: &'a str) -> StoreFuture<'a, Option<Session>> {
        Box::pin(async move {
            let row: Option<SessionRow> = sqlx::query_as(
                "SELECT token_hash, user_id, created_at, expires_at FROM sessions WHERE token_hash = $1",
            )
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
            Ok(row.map(Session::from))
        })
    }

    fn delete_session<'a>(&'a self, token_hash: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
                .bind(token_hash)
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
            Ok(())
        })
    }

    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
            Ok(result.rows_affected())
        })
    }
}

impl HealthProbe for PostgresStore {
    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
            Ok(())
        })
    }
}
