//! Form extraction for the generation endpoints.
//!
//! Every POST route takes either `multipart/form-data` (needed for uploads)
//! or `application/x-www-form-urlencoded`. Both are collected into a
//! [`FormData`], a flat list of named parts, so handlers read fields the same
//! way regardless of encoding.

use axum::extract::{Form, FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use bytes::Bytes;
use std::str::FromStr;

use super::error::ApiError;
use crate::batch::BatchSource;
use crate::color::Color;
use crate::error::{QrBuilderError, Result};

/// One named field of a submitted form.
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    /// Client-supplied file name, present for file uploads only
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// All fields of a submitted form, in submission order.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    parts: Vec<FormPart>,
}

impl FormData {
    pub fn new(parts: Vec<FormPart>) -> Self {
        Self { parts }
    }

    /// First text value named `name`. Blank values count as absent.
    pub fn text(&self, name: &str) -> Result<Option<&str>> {
        let Some(part) = self.part(name) else {
            return Ok(None);
        };
        let value = std::str::from_utf8(&part.bytes).map_err(|_| {
            QrBuilderError::invalid_input(format!("Field '{}' is not valid UTF-8.", name))
        })?;
        Ok(Some(value).filter(|v| !v.trim().is_empty()))
    }

    /// Text value that must be present; kept verbatim (validation trims).
    pub fn required_text(&self, name: &str) -> Result<String> {
        match self.part(name) {
            Some(part) => String::from_utf8(part.bytes.to_vec()).map_err(|_| {
                QrBuilderError::invalid_input(format!("Field '{}' is not valid UTF-8.", name))
            }),
            None => Err(missing(name)),
        }
    }

    /// Parse `name` with `FromStr`, falling back to `default` when absent.
    pub fn parse_or<T: FromStr>(&self, name: &str, default: T) -> Result<T> {
        Ok(self.parse_opt(name)?.unwrap_or(default))
    }

    pub fn parse_opt<T: FromStr>(&self, name: &str) -> Result<Option<T>> {
        match self.text(name)? {
            Some(value) => value.trim().parse().map(Some).map_err(|_| {
                QrBuilderError::invalid_input(format!(
                    "Invalid value for '{}': '{}'.",
                    name,
                    value.trim()
                ))
            }),
            None => Ok(None),
        }
    }

    /// Boolean field; accepts true/false, 1/0, yes/no and on/off.
    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool> {
        let Some(value) = self.text(name)? else {
            return Ok(default);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(QrBuilderError::invalid_input(format!(
                "Invalid value for '{}': '{}'.",
                name,
                value.trim()
            ))),
        }
    }

    pub fn color_or(&self, name: &str, default: Color) -> Result<Color> {
        match self.text(name)? {
            Some(value) => Color::parse(value),
            None => Ok(default),
        }
    }

    /// Raw bytes of the upload named `name`.
    pub fn file(&self, name: &str) -> Result<&FormPart> {
        self.part(name).ok_or_else(|| missing(name))
    }

    /// Every upload named `name`, as batch sources; at least one is required.
    pub fn files(&self, name: &str) -> Result<Vec<BatchSource>> {
        let sources: Vec<BatchSource> = self
            .parts
            .iter()
            .filter(|part| part.name == name)
            .map(|part| BatchSource::new(part.file_name.clone(), part.bytes.to_vec()))
            .collect();
        if sources.is_empty() {
            return Err(missing(name));
        }
        Ok(sources)
    }

    fn part(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|part| part.name == name)
    }
}

fn missing(name: &str) -> QrBuilderError {
    QrBuilderError::invalid_input(format!("Missing required field '{}'.", name))
}

impl<S: Send + Sync> FromRequest<S> for FormData {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::rejected(rejection.status(), rejection.body_text()))?;
            let parts = pairs
                .into_iter()
                .map(|(name, value)| FormPart {
                    name,
                    file_name: None,
                    bytes: Bytes::from(value),
                })
                .collect();
            return Ok(Self::new(parts));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::rejected(rejection.status(), rejection.body_text()))?;

        let mut parts = Vec::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;
            parts.push(FormPart {
                name,
                file_name,
                bytes,
            });
        }

        Ok(Self::new(parts))
    }
}
