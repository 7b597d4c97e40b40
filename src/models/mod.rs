mod customer;
mod customer_type;
mod staff;

pub use customer::{Appearance, Customer, NewCustomer, Outfit};
pub use customer_type::CustomerType;
pub use staff::Staff;
