//! Page slicing over ordered results.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Page number used when a request leaves it unset.
pub const DEFAULT_PAGE_NUMBER: u32 = 0;

/// Zero-based page request. Unset fields fall back to defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageRequest {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number: Some(page_number),
            page_size: Some(page_size),
        }
    }
}

/// The requested page starts past the end of the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOutOfRange {
    pub page_number: u32,
    pub page_size: u32,
    pub len: usize,
}

impl Display for PageOutOfRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "page {} of size {} starts beyond {} results",
            self.page_number, self.page_size, self.len
        )
    }
}

impl Error for PageOutOfRange {}

/// Returns items `[number * size, min(number * size + size, len))`.
///
/// A page starting exactly at `len` is empty; one starting beyond it fails.
pub fn paginate<T>(
    mut items: Vec<T>,
    request: PageRequest,
    default_page_size: u32,
) -> Result<Vec<T>, PageOutOfRange> {
    let page_number = request.page_number.unwrap_or(DEFAULT_PAGE_NUMBER);
    let page_size = request.page_size.unwrap_or(default_page_size);
    let len = items.len();
    let out_of_range = PageOutOfRange {
        page_number,
        page_size,
        len,
    };

    let start = (page_number as usize)
        .checked_mul(page_size as usize)
        .filter(|start| *start <= len)
        .ok_or(out_of_range)?;
    let end = start.saturating_add(page_size as usize).min(len);

    items.truncate(end);
    items.drain(..start);
    Ok(items)
}
