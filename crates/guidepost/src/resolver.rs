#![forbid(unsafe_code)]

//! Target resolution: selector to padded highlight rectangle.
//!
//! Two selector forms are understood:
//!
//! - a plain selector, resolved to one element;
//! - a composite selector ending in the reserved suffix (`-table-intro` by
//!   default). The suffix is stripped and the base selector expands to a
//!   header region and the first data row, highlighted as their union.
//!   Missing either half is a miss; there is no partial highlight.

use guidepost_core::geometry::Rect;

use crate::error::ResolveError;
use crate::settings::{BASE_PLACEHOLDER, CompositeSettings};
use crate::viewport::ViewportQuery;

/// A parsed step target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelector {
    Single(String),
    Composite { header: String, first_row: String },
}

/// Resolves step targets against a [`ViewportQuery`].
#[derive(Debug, Clone, Default)]
pub struct GeometryResolver {
    composite: CompositeSettings,
}

impl GeometryResolver {
    #[must_use]
    pub fn new(composite: CompositeSettings) -> Self {
        Self { composite }
    }

    /// Classify `selector` as plain or composite.
    #[must_use]
    pub fn parse(&self, selector: &str) -> TargetSelector {
        match selector.strip_suffix(self.composite.suffix.as_str()) {
            Some(base) if !base.is_empty() && !self.composite.suffix.is_empty() => {
                TargetSelector::Composite {
                    header: self.composite.header.replace(BASE_PLACEHOLDER, base),
                    first_row: self.composite.first_row.replace(BASE_PLACEHOLDER, base),
                }
            }
            _ => TargetSelector::Single(selector.to_string()),
        }
    }

    /// Unpadded viewport rectangle of `selector`.
    pub fn locate<H: ViewportQuery + ?Sized>(
        &self,
        host: &H,
        selector: &str,
    ) -> Result<Rect, ResolveError> {
        match self.parse(selector) {
            TargetSelector::Single(single) => {
                host.query_rect(&single)
                    .ok_or_else(|| ResolveError::TargetNotFound {
                        selector: selector.to_string(),
                    })
            }
            TargetSelector::Composite { header, first_row } => {
                if let Some(rect) = host.query_combined_rect(&header, &first_row) {
                    return Ok(rect);
                }
                let missing = if host.query_rect(&header).is_none() {
                    header
                } else {
                    first_row
                };
                Err(ResolveError::CompositeIncomplete {
                    selector: selector.to_string(),
                    missing,
                })
            }
        }
    }

    /// Highlight rectangle of `selector`, inflated by `padding` on all sides.
    pub fn resolve<H: ViewportQuery + ?Sized>(
        &self,
        host: &H,
        selector: &str,
        padding: f64,
    ) -> Result<Rect, ResolveError> {
        let rect = self.locate(host, selector)?;
        let padded = rect.inflate(padding);
        tracing::trace!(
            target: "guidepost.geometry",
            selector,
            x = padded.x,
            y = padded.y,
            width = padded.width,
            height = padded.height,
            "target resolved"
        );
        Ok(padded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use guidepost_core::geometry::Point;

    fn doc() -> MemoryDocument {
        MemoryDocument::new(800.0, 600.0)
    }

    #[test]
    fn plain_selector_is_padded() {
        let doc = doc();
        doc.insert("#search", Rect::new(100.0, 50.0, 200.0, 30.0));
        let rect = GeometryResolver::default()
            .resolve(&doc, "#search", 8.0)
            .expect("found");
        assert_eq!(rect, Rect::new(92.0, 42.0, 216.0, 46.0));
    }

    #[test]
    fn missing_selector_is_not_found() {
        let err = GeometryResolver::default()
            .resolve(&doc(), "#ghost", 8.0)
            .expect_err("missing");
        assert_eq!(
            err,
            ResolveError::TargetNotFound {
                selector: "#ghost".into()
            }
        );
    }

    #[test]
    fn composite_parses_into_header_and_row() {
        let resolver = GeometryResolver::default();
        assert_eq!(
            resolver.parse("#patients-table-intro"),
            TargetSelector::Composite {
                header: "#patients thead".into(),
                first_row: "#patients tbody tr:first-child".into(),
            }
        );
        assert_eq!(
            resolver.parse("#patients"),
            TargetSelector::Single("#patients".into())
        );
        assert_eq!(
            resolver.parse("-table-intro"),
            TargetSelector::Single("-table-intro".into())
        );
    }

    #[test]
    fn composite_is_union_of_halves() {
        let doc = doc();
        doc.insert("#t thead", Rect::new(0.0, 0.0, 10.0, 10.0));
        doc.insert("#t tbody tr:first-child", Rect::new(50.0, 50.0, 10.0, 10.0));
        let rect = GeometryResolver::default()
            .resolve(&doc, "#t-table-intro", 0.0)
            .expect("found");
        assert_eq!(rect, Rect::new(0.0, 0.0, 60.0, 60.0));
    }

    #[test]
    fn composite_missing_half_is_a_miss() {
        let doc = doc();
        doc.insert("#t thead", Rect::new(0.0, 0.0, 100.0, 20.0));
        let err = GeometryResolver::default()
            .resolve(&doc, "#t-table-intro", 8.0)
            .expect_err("incomplete");
        assert_eq!(
            err,
            ResolveError::CompositeIncomplete {
                selector: "#t-table-intro".into(),
                missing: "#t tbody tr:first-child".into(),
            }
        );
    }

    #[test]
    fn resolution_tracks_scroll_offset() {
        let doc = doc();
        doc.insert("#footer", Rect::new(0.0, 1500.0, 800.0, 40.0));
        doc.set_scroll_offset(Point::new(0.0, 1200.0));
        let rect = GeometryResolver::default()
            .resolve(&doc, "#footer", 0.0)
            .expect("found");
        assert_eq!(rect.y, 300.0);
    }

    #[test]
    fn custom_composite_convention() {
        let resolver = GeometryResolver::new(CompositeSettings {
            suffix: "::intro".into(),
            header: "{base} .header".into(),
            first_row: "{base} .row:first-of-type".into(),
        });
        assert_eq!(
            resolver.parse(".grid::intro"),
            TargetSelector::Composite {
                header: ".grid .header".into(),
                first_row: ".grid .row:first-of-type".into(),
            }
        );
    }
}
