pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod exec;
pub mod informer;
pub mod nfs;
pub mod record;
