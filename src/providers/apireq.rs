//! A utility module with helpers for making and parsing API requests.

mod client;
mod error;
mod provider;

pub(crate) use client::{error_body, HttpClient};
pub(crate) use error::Error as ReqwestError;
pub(crate) use reqwest::Url;
