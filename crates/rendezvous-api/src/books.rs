// Book collection endpoints

use reqwest::Method;
use serde_json::json;

use crate::auth::AuthStrategy;
use crate::client::BackendClient;
use crate::error::Error;
use crate::models::{Book, BookEnvelope, BooksPayload};

impl BackendClient {
    /// List the authenticated user's collection.
    ///
    /// `GET /api/books`
    pub async fn list_books(&self) -> Result<Vec<Book>, Error> {
        let url = self.url(&["api", "books"])?;
        let payload: BooksPayload = self
            .send(self.request(Method::GET, url, AuthStrategy::Bearer)?)
            .await?;
        Ok(payload.books)
    }

    /// List another user's publicly shared collection.
    ///
    /// `POST /api/publicuser`
    pub async fn public_books(&self, public_id: &str) -> Result<BooksPayload, Error> {
        let url = self.url(&["api", "publicuser"])?;
        let body = json!({ "publicid": public_id });
        self.send(self.request(Method::POST, url, AuthStrategy::Anonymous)?.json(&body))
            .await
    }

    /// Create a book. Any 2xx answer is success; the body is not read
    /// as a model.
    ///
    /// `POST /api/addbook`
    pub async fn add_book(&self, book: &Book) -> Result<(), Error> {
        let url = self.url(&["api", "addbook"])?;
        self.send_empty(
            self.request(Method::POST, url, AuthStrategy::Bearer)?
                .json(&BookEnvelope { book }),
        )
        .await
    }

    /// Replace the stored record for `book.id`.
    ///
    /// `PUT /api/books/{id}`
    pub async fn update_book(&self, book: &Book) -> Result<(), Error> {
        let url = self.url(&["api", "books", &book.id])?;
        self.send_empty(
            self.request(Method::PUT, url, AuthStrategy::Bearer)?
                .json(&BookEnvelope { book }),
        )
        .await
    }

    /// `DELETE /api/books/{id}`
    pub async fn delete_book(&self, id: &str) -> Result<(), Error> {
        let url = self.url(&["api", "books", id])?;
        self.send_empty(self.request(Method::DELETE, url, AuthStrategy::Bearer)?)
            .await
    }
}
