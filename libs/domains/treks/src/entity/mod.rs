pub mod comment;
pub mod trek;
