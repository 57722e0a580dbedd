pub mod app;
pub mod config;
pub mod models;
pub mod pages;
pub mod region;
pub mod tmdb;
