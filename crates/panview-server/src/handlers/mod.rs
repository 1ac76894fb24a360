//! HTTP request handlers.

pub(crate) mod generated;
pub(crate) mod refresh;
pub(crate) mod view;

use panview_site::FormatVariant;

use crate::error::ServerError;

/// Parse the `fmt` query parameter; absent means the standard variant.
pub(crate) fn parse_variant(fmt: Option<&str>) -> Result<FormatVariant, ServerError> {
    match fmt {
        None => Ok(FormatVariant::Standard),
        Some(value) => FormatVariant::parse(value)
            .ok_or_else(|| ServerError::UnknownFormatVariant(value.to_owned())),
    }
}
