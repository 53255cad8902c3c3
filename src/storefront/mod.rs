mod helpers;
mod product_delete;
mod product_details;
mod product_list;
mod product_save;
mod products;
mod review_create;
mod reviews;
mod reviews_subscribe;

use std::sync::Arc;

pub use products::ProductRepository;
pub use reviews::ReviewSubscriptions;
pub use reviews_subscribe::CancelHandle;

use crate::{
  auth::IdentityProvider,
  router::guard::NavigationGuard,
  store::database::DocumentStore,
};

/// The storefront's state, owned by the composition root and handed to the
/// presentation layer. Nothing in it is global.
#[derive(Debug)]
pub struct Storefront {
  pub products: Arc<ProductRepository>,
  pub reviews: ReviewSubscriptions,
  pub guard: NavigationGuard,
}

#[derive(Debug)]
pub struct StorefrontArgs {
  pub store: Arc<dyn DocumentStore>,
  pub identity: Arc<dyn IdentityProvider>,
}

impl Storefront {
  pub fn new(args: StorefrontArgs) -> Storefront {
    let products = Arc::new(ProductRepository::new(args.store.clone()));
    let reviews = ReviewSubscriptions::new(args.store.clone(), products.clone());
    let guard = NavigationGuard::new(args.store, args.identity);

    Storefront { products, reviews, guard }
  }
}
