pub mod claims;
pub mod xlinestore;
