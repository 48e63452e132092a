// 分页参数

/// 分页参数：页码从 1 开始，page_size <= 0 表示不分页
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub page_size: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl Page {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// 不分页，返回全部条目
    pub fn unbounded() -> Self {
        Self {
            page: 1,
            page_size: 0,
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.page_size > 0
    }

    /// 需要跳过的条目数，页码小于 1 时按第一页处理
    pub fn offset(&self) -> usize {
        if !self.is_bounded() {
            return 0;
        }
        let skip = self.page.saturating_sub(1).saturating_mul(self.page_size);
        usize::try_from(skip.max(0)).unwrap_or(usize::MAX)
    }

    /// 对迭代器应用分页
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        if !self.is_bounded() {
            return items.into_iter().collect();
        }
        let take = usize::try_from(self.page_size).unwrap_or(usize::MAX);
        items.into_iter().skip(self.offset()).take(take).collect()
    }
}
