// Wire models for the Books Rendezvous backend.
//
// All payloads are camelCase JSON. Decoding is deliberately lenient
// where the backend is loose (nullable arrays, ratings that arrive as
// floats or strings); encoding emits exactly what the backend reads.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexSet;
use secrecy::SecretString;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

// ── Books ───────────────────────────────────────────────────────────

/// Reading status of a book in the collection.
///
/// Statuses this client does not know (the backend's column default is
/// `pending`) decode as `Unknown` so one odd record cannot fail a whole
/// listing. `Unknown` is never parsed from user input.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BookStatus {
    Reading,
    Finished,
    ToRead,
    #[serde(other)]
    #[strum(disabled)]
    Unknown,
}

/// A book record as exchanged with the backend.
///
/// `id` is server-assigned and unique within a collection. Catalog
/// metadata (`image_url`, `description`, `page_count`,
/// `published_date`) is copied from an external catalog lookup when the
/// book is first added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    #[serde(default)]
    pub google_books_id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<String>,
    pub status: BookStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<IndexSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "lenient_rating",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abandoned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

impl Book {
    /// A book with only the required fields set.
    pub fn new(
        id: impl Into<String>,
        google_books_id: impl Into<String>,
        title: impl Into<String>,
        authors: Vec<String>,
        status: BookStatus,
    ) -> Self {
        Self {
            id: id.into(),
            google_books_id: google_books_id.into(),
            title: title.into(),
            authors,
            status,
            genres: None,
            progress: None,
            start_date: None,
            end_date: None,
            rating: None,
            comment: None,
            abandoned: None,
            favorite: None,
            image_url: None,
            description: None,
            page_count: None,
            published_date: None,
        }
    }
}

/// `{ "books": [...] }` -- returned by the own-collection and public
/// collection endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BooksPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub books: Vec<Book>,
}

/// Request body for create/update: the book is wrapped as `{ "book": ... }`.
#[derive(Serialize)]
pub(crate) struct BookEnvelope<'a> {
    pub book: &'a Book,
}

// ── Stats & achievements ────────────────────────────────────────────

/// Aggregate statistics computed by the backend over the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsSnapshot {
    pub total_books: u64,
    pub completed_books: u64,
    pub to_read_books: u64,
    pub reading_books: u64,
    pub favorite_books: u64,
    pub total_pages: u64,
    pub average_rating: f64,
}

/// An achievement as listed by `GET /api/achievements`. Hidden
/// achievements only appear once unlocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AchievementsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub achievements: Vec<Achievement>,
}

// ── Session ─────────────────────────────────────────────────────────

/// Successful `POST /api/login` response.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(deserialize_with = "secret_string")]
    pub token: SecretString,
    #[serde(default)]
    pub pseudo: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// `GET /api/user` -- the account behind the current token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// `GET /api/getpublicvisibility` -- sharing flag and public share id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    pub public: bool,
    #[serde(rename = "sharelink", default)]
    pub share_link: Option<String>,
}

// ── Serde helpers ───────────────────────────────────────────────────

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn secret_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RatingRepr {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Ratings arrive as integers, floats (form inputs) or numeric strings.
/// Fractions are truncated; an empty string reads as "no rating".
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn lenient_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    let Some(raw) = Option::<RatingRepr>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let value = match raw {
        RatingRepr::Int(n) => n,
        RatingRepr::Float(f) => f.trunc() as i64,
        RatingRepr::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>()
                .map_err(|e| de::Error::custom(format!("invalid rating {s:?}: {e}")))?
                .trunc() as i64
        }
    };

    u8::try_from(value)
        .map(Some)
        .map_err(|_| de::Error::custom(format!("rating {value} out of range")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn status_uses_kebab_case_on_the_wire() {
        assert_eq!(serde_json::to_value(BookStatus::ToRead).unwrap(), json!("to-read"));
        assert_eq!("to-read".parse::<BookStatus>().unwrap(), BookStatus::ToRead);
        assert_eq!(BookStatus::Finished.to_string(), "finished");
    }

    #[test]
    fn unrecognised_status_decodes_as_unknown() {
        let raw = json!({ "id": "b1", "title": "Dune", "status": "pending" });
        let book: Book = serde_json::from_value(raw).unwrap();
        assert_eq!(book.status, BookStatus::Unknown);
        assert!("unknown".parse::<BookStatus>().is_err());
    }

    #[test]
    fn rating_accepts_float_and_string() {
        let base = json!({ "id": "b1", "title": "Dune", "status": "reading" });

        let mut float = base.clone();
        float["rating"] = json!(3.8);
        let book: Book = serde_json::from_value(float).unwrap();
        assert_eq!(book.rating, Some(3));

        let mut text = base.clone();
        text["rating"] = json!("4");
        let book: Book = serde_json::from_value(text).unwrap();
        assert_eq!(book.rating, Some(4));

        let mut empty = base;
        empty["rating"] = json!("");
        let book: Book = serde_json::from_value(empty).unwrap();
        assert_eq!(book.rating, None);
    }

    #[test]
    fn negative_rating_is_rejected() {
        let raw = json!({ "id": "b1", "title": "Dune", "status": "reading", "rating": -1 });
        assert!(serde_json::from_value::<Book>(raw).is_err());
    }

    #[test]
    fn backend_book_with_nulls_decodes() {
        let raw = json!({
            "id": "6f1c",
            "userId": "u1",
            "googleBooksId": "g-42",
            "status": "finished",
            "rating": 5,
            "comment": "",
            "title": "Dune",
            "imageUrl": "https://img",
            "authors": null,
            "description": "Spice",
            "favorite": true,
            "pageCount": 412,
            "genres": null,
            "publishedDate": "1965"
        });
        let book: Book = serde_json::from_value(raw).unwrap();
        assert!(book.authors.is_empty());
        assert_eq!(book.genres, None);
        assert_eq!(book.page_count, Some(412));
        assert_eq!(book.favorite, Some(true));
    }

    #[test]
    fn genres_keep_insertion_order_and_drop_duplicates() {
        let raw = json!({
            "id": "b1", "title": "Dune", "status": "to-read",
            "genres": ["sf", "classic", "sf"]
        });
        let book: Book = serde_json::from_value(raw).unwrap();
        let genres: Vec<_> = book.genres.unwrap().into_iter().collect();
        assert_eq!(genres, vec!["sf".to_string(), "classic".to_string()]);
    }

    #[test]
    fn unset_optionals_are_not_serialized() {
        let book = Book::new("b1", "g1", "Dune", vec!["Frank Herbert".into()], BookStatus::Reading);
        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "b1",
                "googleBooksId": "g1",
                "title": "Dune",
                "authors": ["Frank Herbert"],
                "status": "reading"
            })
        );
    }

    #[test]
    fn stats_missing_fields_default_to_zero() {
        let stats: StatsSnapshot = serde_json::from_value(json!({ "totalBooks": 3 })).unwrap();
        assert_eq!(stats.total_books, 3);
        assert_eq!(stats.total_pages, 0);
    }
}
