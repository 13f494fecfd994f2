use serde::{Deserialize, Serialize};

/// Pagination parameters: zero-based page index, page size, and an optional
/// `column` / `column,desc` sort directive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pageable {
    pub page: u64,
    pub size: u64,
    pub sort: Option<String>,
}

impl Default for Pageable {
    fn default() -> Self {
        Self {
            page: 0,
            size: 20,
            sort: None,
        }
    }
}

impl Pageable {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    pub fn sorted_by(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Rows skipped before this page starts.
    pub fn offset(&self) -> u64 {
        self.page * self.size
    }

    /// The parsed sort directive: `(column, ascending)`.
    pub fn order(&self) -> Option<(String, bool)> {
        let sort = self.sort.as_deref()?.trim();
        if sort.is_empty() {
            return None;
        }
        match sort.split_once(',') {
            Some((column, direction)) => Some((
                column.trim().to_string(),
                !direction.trim().eq_ignore_ascii_case("desc"),
            )),
            None => Some((sort.to_string(), true)),
        }
    }
}

/// A page of results with pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pageable: &Pageable, total_elements: u64) -> Self {
        let total_pages = if pageable.size == 0 {
            0
        } else {
            total_elements.div_ceil(pageable.size)
        };
        Self {
            content,
            page: pageable.page,
            size: pageable.size,
            total_elements,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(Pageable::new(2, 10).offset(), 20);
        assert_eq!(Pageable::default().offset(), 0);
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!(
            Pageable::new(0, 10).sorted_by("name").order(),
            Some(("name".into(), true))
        );
        assert_eq!(
            Pageable::new(0, 10).sorted_by("name,desc").order(),
            Some(("name".into(), false))
        );
        assert_eq!(
            Pageable::new(0, 10).sorted_by("name, DESC").order(),
            Some(("name".into(), false))
        );
        assert_eq!(Pageable::new(0, 10).order(), None);
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new(vec![1, 2, 3], &Pageable::new(0, 3), 7);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_elements, 7);
    }
}
