//! Price Tag OCR
//!
//! This library provides the core functionality for the price-tag-ocr
//! service: detecting price tag regions in retail photographs, extracting
//! their text through an OCR capability, and running that pipeline as
//! pollable async jobs.

pub mod app_state;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod services;
