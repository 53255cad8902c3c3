use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::{Value, from_value, to_value};

use crate::{
  models::{errors::StoreError, time::format_human_readable_time},
  store::database::{Document, DocumentData, errors::DBError},
};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
  #[serde(skip)]
  pub id: String,
  pub user_id: String,
  pub email: String,
  #[serde(deserialize_with = "deserialize_rating")]
  pub rating: u8,
  pub review_text: String,
  /// Unix epoch milliseconds, stamped when the review was written.
  pub created_at: i64,
}

// Other writers may store the rating as a float (`4.0`). Integral values in
// range are accepted, anything else is rejected.
fn deserialize_rating<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
  let n = f64::deserialize(d)?;
  if n.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&n) {
    return Err(D::Error::custom(format!("invalid rating {}", n)));
  }
  Ok(n as u8)
}

impl Review {
  pub fn from_document(doc: Document, path: &str) -> Result<Self, DBError> {
    let mut review: Review =
      from_value(Value::Object(doc.data)).map_err(|err| DBError::json_unmarshal(err, path))?;
    review.id = doc.id;
    Ok(review)
  }

  pub fn posted_ago(&self, now_ms: i64) -> String {
    format_human_readable_time(self.created_at, now_ms)
  }
}

/// What a signed-in user submits. The id and timestamp are added on write.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDraft {
  pub user_id: String,
  pub email: String,
  pub rating: u8,
  pub review_text: String,
}

impl ReviewDraft {
  pub fn validate(&self) -> Result<(), StoreError> {
    if self.user_id.is_empty() {
      return Err(StoreError::validation("userId", "must not be empty"));
    }
    if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
      return Err(StoreError::validation(
        "rating",
        format!("{} is outside {}..={}", self.rating, MIN_RATING, MAX_RATING),
      ));
    }
    if self.review_text.trim().is_empty() {
      return Err(StoreError::validation("reviewText", "must not be empty"));
    }
    Ok(())
  }

  pub fn into_document_data(self, created_at: i64, path: &str) -> Result<DocumentData, DBError> {
    let review = Review {
      id: String::new(),
      user_id: self.user_id,
      email: self.email,
      rating: self.rating,
      review_text: self.review_text,
      created_at,
    };

    match to_value(&review).map_err(|err| DBError::json_marshal(err, path))? {
      Value::Object(data) => Ok(data),
      other => Err(DBError::json_marshal(
        serde::ser::Error::custom(format!("expected an object, got {}", other)),
        path,
      )),
    }
  }
}

/// The review block of a product page: mean rating, count and the newest
/// review.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSummary {
  pub average: f64,
  pub count: usize,
  pub latest: Option<Review>,
}

impl ReviewSummary {
  pub fn from_reviews(reviews: &[Review]) -> Self {
    Self {
      average: average_rating(reviews),
      count: reviews.len(),
      latest: reviews.iter().max_by_key(|r| r.created_at).cloned(),
    }
  }
}

/// Mean of the ratings, `0.0` for no reviews.
pub fn average_rating(reviews: &[Review]) -> f64 {
  if reviews.is_empty() {
    return 0.0;
  }
  let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
  f64::from(total) / reviews.len() as f64
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn review(id: &str, rating: u8, created_at: i64) -> Review {
    Review {
      id: id.into(),
      user_id: "u1".into(),
      email: "user@example.com".into(),
      rating,
      review_text: "Great product!".into(),
      created_at,
    }
  }

  fn draft(rating: u8) -> ReviewDraft {
    ReviewDraft {
      user_id: "u1".into(),
      email: "user@example.com".into(),
      rating,
      review_text: "This is a test review".into(),
    }
  }

  #[test]
  fn average_of_known_ratings() {
    assert_eq!(average_rating(&[]), 0.0);
    assert_eq!(average_rating(&[review("a", 4, 0)]), 4.0);
    assert_eq!(average_rating(&[review("a", 2, 0), review("b", 4, 1)]), 3.0);
  }

  #[test]
  fn summary_picks_the_newest_review() {
    let reviews = vec![review("new", 5, 20), review("old", 3, 10)];
    let summary = ReviewSummary::from_reviews(&reviews);

    assert_eq!(summary.count, 2);
    assert_eq!(summary.average, 4.0);
    assert_eq!(summary.latest.map(|r| r.id), Some("new".to_string()));
    assert_eq!(ReviewSummary::from_reviews(&[]).latest, None);
  }

  #[test]
  fn draft_rating_must_be_on_the_scale() {
    assert!(draft(1).validate().is_ok());
    assert!(draft(5).validate().is_ok());
    assert!(draft(0).validate().is_err());
    assert!(draft(6).validate().is_err());

    let mut empty = draft(4);
    empty.review_text = "  ".into();
    assert!(empty.validate().is_err());
  }

  #[test]
  fn draft_document_carries_the_timestamp() {
    let data = draft(4).into_document_data(1_700_000_000_000, "products/1/reviews").unwrap();

    assert_eq!(data["createdAt"], json!(1_700_000_000_000i64));
    assert_eq!(data["reviewText"], json!("This is a test review"));
    assert_eq!(data["userId"], json!("u1"));
    assert!(!data.contains_key("id"));
  }

  #[test]
  fn decodes_with_the_document_id() {
    let doc = Document {
      id: "r1".into(),
      data: match json!({
        "userId": "u1",
        "email": "user@example.com",
        "rating": 4,
        "reviewText": "Great product!",
        "createdAt": 1_672_531_200_000i64
      }) {
        Value::Object(data) => data,
        _ => unreachable!(),
      },
    };

    let r = Review::from_document(doc, "products/1/reviews/r1").unwrap();
    assert_eq!(r, review("r1", 4, 1_672_531_200_000));
  }

  fn stored_with_rating(rating: Value) -> Document {
    let data = match json!({
      "userId": "u1",
      "email": "user@example.com",
      "rating": rating,
      "reviewText": "Great product!",
      "createdAt": 1
    }) {
      Value::Object(data) => data,
      _ => unreachable!(),
    };
    Document { id: "r1".into(), data }
  }

  #[test]
  fn integral_float_ratings_decode() {
    let r = Review::from_document(stored_with_rating(json!(4.0)), "r1").unwrap();
    assert_eq!(r.rating, 4);

    assert!(Review::from_document(stored_with_rating(json!(4.5)), "r1").is_err());
    assert!(Review::from_document(stored_with_rating(json!(-1)), "r1").is_err());
    assert!(Review::from_document(stored_with_rating(json!("4")), "r1").is_err());
  }
}
