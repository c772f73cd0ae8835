//! Record extraction from one catalog entry.
//!
//! The catalog's markup uses generated class names, so every selector that
//! depends on it lives in [`ContainerField::spec`]. When the site changes,
//! that table is the only place to update.

use crate::error::AppError;
use crate::models::Record;
use crate::traits::PageElement;

pub(crate) const TITLE_SLICE: &str = r#"span[class^="GameSlice__Title"]"#;
pub(crate) const RATING_SUMMARY: &str = r#"span[class^="Summary__GrowingSpan"]"#;
pub(crate) const REPORTS_EXPANDER: &str = r#"div[class*="GameSlice__Expander-"]"#;

/// The parts of a record container that hold record data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerField {
    Title,
    Identifier,
    Rating,
    ReportCount,
}

/// Where a field's value is read from once its element is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    Text,
    Attribute(&'static str),
}

/// Selector path from the container to the field element, plus the value source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub path: &'static [&'static str],
    pub source: FieldSource,
}

impl ContainerField {
    pub fn name(self) -> &'static str {
        match self {
            ContainerField::Title => "title",
            ContainerField::Identifier => "identifier",
            ContainerField::Rating => "rating",
            ContainerField::ReportCount => "report_count",
        }
    }

    pub fn spec(self) -> FieldSpec {
        match self {
            ContainerField::Title => FieldSpec {
                path: &[TITLE_SLICE, "a"],
                source: FieldSource::Text,
            },
            ContainerField::Identifier => FieldSpec {
                path: &[TITLE_SLICE, "a"],
                source: FieldSource::Attribute("href"),
            },
            ContainerField::Rating => FieldSpec {
                path: &[RATING_SUMMARY],
                source: FieldSource::Text,
            },
            ContainerField::ReportCount => FieldSpec {
                path: &[REPORTS_EXPANDER, "span"],
                source: FieldSource::Text,
            },
        }
    }
}

/// Read one field of a record container.
///
/// A missing element or attribute becomes [`AppError::ExtractionError`]
/// naming the field.
pub async fn find_container_field<E: PageElement>(
    container: &E,
    field: ContainerField,
) -> Result<String, AppError> {
    let spec = field.spec();
    let missing = |message: String| AppError::ExtractionError {
        field: field.name(),
        message,
    };

    let Some((first, rest)) = spec.path.split_first() else {
        return Err(missing("empty selector path".into()));
    };

    let mut node = container
        .find_element(first)
        .await
        .map_err(|e| not_found_as(e, &missing))?;
    for selector in rest {
        node = node
            .find_element(selector)
            .await
            .map_err(|e| not_found_as(e, &missing))?;
    }

    match spec.source {
        FieldSource::Text => Ok(node.text().await?.trim().to_string()),
        FieldSource::Attribute(name) => node
            .attribute(name)
            .await?
            .ok_or_else(|| missing(format!("element has no '{name}' attribute"))),
    }
}

fn not_found_as(err: AppError, missing: &impl Fn(String) -> AppError) -> AppError {
    match err {
        AppError::ElementNotFound(selector) => missing(format!("no element matches {selector}")),
        other => other,
    }
}

/// Build a [`Record`] from one record container.
pub async fn extract_record<E: PageElement>(container: &E) -> Result<Record, AppError> {
    let title = find_container_field(container, ContainerField::Title).await?;
    let href = find_container_field(container, ContainerField::Identifier).await?;
    let identifier = trailing_segment(&href)
        .ok_or_else(|| AppError::ExtractionError {
            field: ContainerField::Identifier.name(),
            message: format!("link '{href}' has no trailing path segment"),
        })?
        .to_string();
    let rating = find_container_field(container, ContainerField::Rating).await?;
    let report_count = find_container_field(container, ContainerField::ReportCount).await?;

    Ok(Record {
        identifier,
        title,
        rating,
        report_count,
    })
}

/// Last path segment of a link, ignoring query and fragment.
///
/// `https://www.protondb.com/app/620?x=1` → `620`
pub fn trailing_segment(href: &str) -> Option<&str> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.rsplit('/').next().filter(|segment| !segment.is_empty())
}
