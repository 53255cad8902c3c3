use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::{
  models::errors::StoreError,
  store::database::{Document, DocumentData, errors::DBError},
};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
  Electronics,
  Clothing,
  Books,
  Home,
}

impl Category {
  pub const ALL: [Category; 4] =
    [Category::Electronics, Category::Clothing, Category::Books, Category::Home];

  pub fn as_str(&self) -> &'static str {
    match self {
      Category::Electronics => "Electronics",
      Category::Clothing => "Clothing",
      Category::Books => "Books",
      Category::Home => "Home",
    }
  }
}

impl FromStr for Category {
  type Err = StoreError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Category::ALL
      .into_iter()
      .find(|c| c.as_str() == s)
      .ok_or_else(|| StoreError::validation("category", format!("unknown category {:?}", s)))
  }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
  #[display("In Stock")]
  #[serde(rename = "In Stock")]
  InStock,
  #[display("Out of Stock")]
  #[serde(rename = "Out of Stock")]
  OutOfStock,
}

/// A catalog product. `id` is `None` until the store has assigned one and
/// is never part of the stored document body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  #[serde(skip)]
  pub id: Option<String>,
  pub name: String,
  pub price: f64,
  pub category: Category,
  pub images: Vec<String>,
  pub stock_status: StockStatus,
}

// Stored shape. Older documents carry a single `image` string instead of
// the `images` array.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDocument {
  name: String,
  price: f64,
  category: Category,
  #[serde(default)]
  images: Option<Vec<String>>,
  #[serde(default)]
  image: Option<String>,
  stock_status: StockStatus,
}

impl Product {
  pub fn from_document(doc: Document, path: &str) -> Result<Self, DBError> {
    let stored: ProductDocument =
      from_value(Value::Object(doc.data)).map_err(|err| DBError::json_unmarshal(err, path))?;

    let images = match (stored.images, stored.image) {
      (Some(images), _) => images,
      (None, Some(image)) if !image.is_empty() => vec![image],
      _ => vec![],
    };

    Ok(Product {
      id: Some(doc.id),
      name: stored.name,
      price: stored.price,
      category: stored.category,
      images,
      stock_status: stored.stock_status,
    })
  }

  pub fn to_document_data(&self, path: &str) -> Result<DocumentData, DBError> {
    match to_value(self).map_err(|err| DBError::json_marshal(err, path))? {
      Value::Object(data) => Ok(data),
      other => Err(DBError::json_marshal(
        serde::ser::Error::custom(format!("expected an object, got {}", other)),
        path,
      )),
    }
  }

  /// A non-empty name and a finite, non-negative price.
  pub fn validate(&self) -> Result<(), StoreError> {
    if self.name.trim().is_empty() {
      return Err(StoreError::validation("name", "must not be empty"));
    }
    if !self.price.is_finite() || self.price < 0.0 {
      return Err(StoreError::validation("price", format!("{} is not a valid price", self.price)));
    }
    Ok(())
  }

  /// The image shown on listing cards.
  pub fn cover_image(&self) -> Option<&str> {
    self.images.first().map(String::as_str)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
  #[default]
  Price,
  Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  #[default]
  Asc,
  Desc,
}

/// Listing filter applied on top of the cached product list. Sorting is
/// stable so equal keys keep the store order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
  pub category: Option<Category>,
  pub sort_by: SortBy,
  pub sort_order: SortOrder,
}

impl ProductFilter {
  pub fn apply(&self, products: &[Product]) -> Vec<Product> {
    let mut out: Vec<Product> = products
      .iter()
      .filter(|p| self.category.is_none_or(|c| p.category == c))
      .cloned()
      .collect();

    out.sort_by(|a, b| {
      let ord = match self.sort_by {
        SortBy::Price => a.price.total_cmp(&b.price),
        SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
      };
      match self.sort_order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
      }
    });

    out
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn doc(id: &str, value: Value) -> Document {
    match value {
      Value::Object(data) => Document { id: id.into(), data },
      _ => panic!("expected an object"),
    }
  }

  fn product(name: &str, price: f64, category: Category) -> Product {
    Product {
      id: None,
      name: name.into(),
      price,
      category,
      images: vec![],
      stock_status: StockStatus::InStock,
    }
  }

  #[test]
  fn decodes_the_stored_shape() {
    let p = Product::from_document(
      doc(
        "1",
        json!({
          "name": "Widget",
          "price": 9.99,
          "category": "Electronics",
          "images": ["https://example.com/w.jpg"],
          "stockStatus": "In Stock"
        }),
      ),
      "products/1",
    )
    .unwrap();

    assert_eq!(p.id.as_deref(), Some("1"));
    assert_eq!(p.name, "Widget");
    assert_eq!(p.price, 9.99);
    assert_eq!(p.category, Category::Electronics);
    assert_eq!(p.stock_status, StockStatus::InStock);
    assert_eq!(p.cover_image(), Some("https://example.com/w.jpg"));
  }

  #[test]
  fn legacy_single_image_becomes_images() {
    let p = Product::from_document(
      doc(
        "2",
        json!({
          "name": "Lamp",
          "price": 20,
          "category": "Home",
          "image": "https://example.com/lamp.jpg",
          "stockStatus": "Out of Stock"
        }),
      ),
      "products/2",
    )
    .unwrap();

    assert_eq!(p.images, vec!["https://example.com/lamp.jpg".to_string()]);
    assert_eq!(p.stock_status, StockStatus::OutOfStock);
  }

  #[test]
  fn missing_fields_fail_to_decode() {
    let err = Product::from_document(doc("3", json!({"name": "x"})), "products/3").unwrap_err();
    assert_eq!(err.path, "products/3");
  }

  #[test]
  fn document_body_never_contains_the_id() {
    let mut p = product("Book", 12.0, Category::Books);
    p.id = Some("abc".into());

    let data = p.to_document_data("products/abc").unwrap();
    assert!(!data.contains_key("id"));
    assert_eq!(data["stockStatus"], json!("In Stock"));
    assert_eq!(data["images"], json!([]));
  }

  #[test]
  fn validation_rejects_bad_prices_and_names() {
    assert!(product("ok", 0.0, Category::Home).validate().is_ok());
    assert!(product("", 1.0, Category::Home).validate().is_err());
    assert!(product("neg", -1.0, Category::Home).validate().is_err());
    assert!(product("nan", f64::NAN, Category::Home).validate().is_err());
  }

  #[test]
  fn category_parses_only_known_labels() {
    assert_eq!("Books".parse::<Category>().unwrap(), Category::Books);
    assert!("Toys".parse::<Category>().is_err());
    assert_eq!(Category::Clothing.to_string(), "Clothing");
  }

  #[test]
  fn filter_by_category_and_sort_by_price() {
    let products = vec![
      product("Product 1", 99.0, Category::Electronics),
      product("Product 2", 49.0, Category::Clothing),
      product("Product 3", 19.0, Category::Electronics),
    ];

    let filter = ProductFilter { category: Some(Category::Electronics), ..Default::default() };
    let names: Vec<String> = filter.apply(&products).into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Product 3", "Product 1"]);

    let filter = ProductFilter { sort_order: SortOrder::Desc, ..Default::default() };
    let names: Vec<String> = filter.apply(&products).into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Product 1", "Product 2", "Product 3"]);
  }

  #[test]
  fn sort_by_name_ignores_case() {
    let products =
      vec![product("beta", 1.0, Category::Home), product("Alpha", 2.0, Category::Home)];
    let filter = ProductFilter { sort_by: SortBy::Name, ..Default::default() };
    assert_eq!(filter.apply(&products)[0].name, "Alpha");
  }
}
