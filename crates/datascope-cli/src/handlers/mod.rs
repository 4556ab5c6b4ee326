pub mod browse;
pub mod capabilities;
pub mod containers;
pub mod delete;
pub mod download;
pub mod entities;
pub mod info;
pub mod query;
pub mod service;
