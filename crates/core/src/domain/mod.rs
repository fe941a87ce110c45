pub mod customer;
pub mod external;
pub mod shopping_list;
