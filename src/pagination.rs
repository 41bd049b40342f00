/// Fixed-size page window over an in-memory list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
  page_size: usize,
  page: usize,
}

impl Paginator {
  pub fn new(page_size: usize) -> Self {
    Self {
      page_size: page_size.max(1),
      page: 1,
    }
  }

  pub fn page_size(&self) -> usize {
    self.page_size
  }

  /// Current page, 1-based
  pub fn page(&self) -> usize {
    self.page
  }

  /// Number of pages for `len` items; an empty list still has one page
  pub fn page_count(&self, len: usize) -> usize {
    len.div_ceil(self.page_size).max(1)
  }

  /// Jump to a page. Requests outside `1..=page_count` are ignored.
  pub fn go_to(&mut self, page: usize, len: usize) -> bool {
    if page == 0 || page > self.page_count(len) || page == self.page {
      return false;
    }
    self.page = page;
    true
  }

  pub fn next(&mut self, len: usize) -> bool {
    self.go_to(self.page + 1, len)
  }

  pub fn prev(&mut self, len: usize) -> bool {
    self.go_to(self.page.saturating_sub(1), len)
  }

  /// Pull the page back into range after the list shrank
  pub fn clamp(&mut self, len: usize) {
    self.page = self.page.min(self.page_count(len));
  }

  /// Index range of the current page within a list of `len` items
  pub fn range(&self, len: usize) -> std::ops::Range<usize> {
    let start = ((self.page - 1) * self.page_size).min(len);
    let end = (start + self.page_size).min(len);
    start..end
  }

  pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
    &items[self.range(items.len())]
  }
}
