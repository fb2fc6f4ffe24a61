//! Microloan Scoring API Library
//!
//! This library backs the administrative loan-management channel: it
//! aggregates applicant data spread across the beneficiary tables,
//! derives the fixed-schema feature vectors for the externally hosted
//! ML scorers, and exposes the admin review workflow over HTTP.
//!
//! # Modules
//!
//! - `approval`: Heuristic eligibility scores, band labels and EMI math.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `errors`: Error handling types.
//! - `fraud`: Fraud feature-vector mapper.
//! - `handlers`: HTTP request handlers.
//! - `history`: Manual loan-history row coercion and validation.
//! - `models`: Section structs, feature vectors and API payloads.
//! - `need`: Socio-economic need feature-vector mapper.
//! - `profile`: Applicant profile resolution.
//! - `risk`: Credit-risk feature-vector mapper.
//! - `scorers`: Clients for the external ML scoring services.
//! - `scoring`: Per-scorer orchestration pipelines.
//! - `store`: Database read/write operations.

pub mod approval;
pub mod config;
pub mod db;
pub mod errors;
pub mod fraud;
pub mod handlers;
pub mod history;
pub mod models;
pub mod need;
pub mod profile;
pub mod risk;
pub mod scorers;
pub mod scoring;
pub mod store;
