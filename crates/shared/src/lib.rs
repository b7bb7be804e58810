pub mod countries;
pub mod domain;
pub mod error;
pub mod form;
pub mod protocol;
