pub mod contact;
pub mod gateway;
pub mod quote;
