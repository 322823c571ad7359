pub mod newsletter;
pub mod orders;
pub mod payment_transactions;
pub mod products;
pub mod reviews;
pub mod users;

pub use newsletter::Entity as Newsletter;
pub use orders::Entity as Orders;
pub use payment_transactions::Entity as PaymentTransactions;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
