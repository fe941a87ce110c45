pub mod config;
pub mod domain;
pub mod errors;
pub mod matching;
pub mod merge;

pub use domain::customer::{Address, Classification, Customer, CustomerId, CustomerKind};
pub use domain::external::ExternalCustomer;
pub use domain::shopping_list::ShoppingList;
pub use errors::ConflictError;
pub use matching::{validate, CustomerMatch, DuplicateSlot, MatchTerm};
