use std::sync::Arc;
use std::time::Duration;

use megacommerce_storefront::auth::{IdentityHub, Principal};
use megacommerce_storefront::models::products::{
  Category, Product, ProductFilter, SortBy, SortOrder, StockStatus,
};
use megacommerce_storefront::models::reviews::ReviewDraft;
use megacommerce_storefront::router::guard::GuardDecision;
use megacommerce_storefront::router::{Route, RouteMeta};
use megacommerce_storefront::store::database::{DocumentStore, USERS_COLLECTION};
use megacommerce_storefront::store::memory::MemoryStore;
use megacommerce_storefront::storefront::{Storefront, StorefrontArgs};
use serde_json::{Value, json};
use tokio::sync::broadcast::Receiver;
use tokio::time::timeout;

fn product(name: &str, price: f64, category: Category) -> Product {
  Product {
    id: None,
    name: name.into(),
    price,
    category,
    images: vec![format!("https://cdn.example.com/{}.png", name)],
    stock_status: StockStatus::InStock,
  }
}

fn draft(rating: u8, text: &str) -> ReviewDraft {
  ReviewDraft {
    user_id: "u1".into(),
    email: "u1@example.com".into(),
    rating,
    review_text: text.into(),
  }
}

async fn next_update(rx: &mut Receiver<String>) -> String {
  timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap()
}

#[tokio::test]
async fn browse_review_and_manage_the_catalog() {
  let store = Arc::new(MemoryStore::new());
  let identity = Arc::new(IdentityHub::new());
  let storefront =
    Storefront::new(StorefrontArgs { store: store.clone(), identity: identity.clone() });

  // admin adds the catalog
  let lamp = storefront.products.save(product("lamp", 40.0, Category::Home)).await.unwrap();
  let novel = storefront.products.save(product("novel", 12.5, Category::Books)).await.unwrap();
  let phone = product("phone", 499.0, Category::Electronics);
  let phone = storefront.products.save(phone).await.unwrap();
  assert_eq!(storefront.products.products().len(), 3);

  let filter =
    ProductFilter { category: None, sort_by: SortBy::Price, sort_order: SortOrder::Desc };
  let names: Vec<String> =
    storefront.products.filtered_products(&filter).into_iter().map(|p| p.name).collect();
  assert_eq!(names, vec!["phone", "lamp", "novel"]);

  // a shopper opens the lamp and leaves reviews
  let lamp_id = lamp.id.clone().unwrap();
  let fetched = storefront.products.fetch_one(&lamp_id).await.unwrap();
  assert_eq!(fetched.name, "lamp");

  let mut updates = storefront.reviews.updates();
  let handles = storefront.reviews.subscribe_all().await.unwrap();
  assert_eq!(handles.len(), 3);
  for _ in 0..3 {
    next_update(&mut updates).await;
  }

  storefront.reviews.add_review(&lamp_id, draft(5, "bright")).await.unwrap();
  assert_eq!(next_update(&mut updates).await, lamp_id);
  storefront.reviews.add_review(&lamp_id, draft(3, "wobbly base")).await.unwrap();
  assert_eq!(next_update(&mut updates).await, lamp_id);

  assert_eq!(storefront.reviews.review_count(&lamp_id), 2);
  assert_eq!(storefront.reviews.average_rating(&lamp_id), 4.0);
  assert_eq!(storefront.reviews.review_count(novel.id.as_deref().unwrap()), 0);

  // price change and removal
  let cheaper = Product { price: 35.0, ..lamp };
  storefront.products.save(cheaper).await.unwrap();
  assert_eq!(storefront.products.fetch_one(&lamp_id).await.unwrap().price, 35.0);

  storefront.products.delete(phone.id.as_deref().unwrap()).await.unwrap();
  assert_eq!(storefront.products.products().len(), 2);

  storefront.reviews.cancel_all();
  assert_eq!(storefront.reviews.active_subscriptions(), 0);
  assert_eq!(storefront.reviews.review_count(&lamp_id), 2);
}

#[tokio::test]
async fn the_dashboard_is_gated_on_the_role_claim() {
  let store = Arc::new(MemoryStore::new());
  let identity = Arc::new(IdentityHub::new());
  let storefront =
    Storefront::new(StorefrontArgs { store: store.clone(), identity: identity.clone() });

  let role = |role: &str| match json!({"name": "n", "email": "e@example.com", "role": role}) {
    Value::Object(data) => data,
    _ => unreachable!(),
  };
  store.set(USERS_COLLECTION, "boss", role("admin")).await.unwrap();
  store.set(USERS_COLLECTION, "shopper", role("user")).await.unwrap();

  let dashboard = Route::new("dashboard", vec![RouteMeta::public(), RouteMeta::admin()]);

  identity.sign_out();
  assert_eq!(storefront.guard.before_each(&dashboard).await, GuardDecision::DeniedToLogin);

  identity.sign_in(Principal { uid: "shopper".into(), email: None });
  assert_eq!(storefront.guard.before_each(&dashboard).await, GuardDecision::DeniedToHome);

  identity.sign_in(Principal { uid: "boss".into(), email: None });
  assert_eq!(storefront.guard.before_each(&dashboard).await, GuardDecision::Allowed);
}
