//! Row storage shared by all list models

use tokio::sync::watch;

use super::Observable;

#[derive(Debug)]
struct ListState<T> {
    rows: Vec<T>,
    loading: bool,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            loading: false,
        }
    }
}

/// Rows plus a loading flag. Rows are only ever replaced as a whole.
#[derive(Debug)]
pub struct ListModel<T> {
    state: Observable<ListState<T>>,
}

impl<T> Clone for ListModel<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T> Default for ListModel<T> {
    fn default() -> Self {
        Self {
            state: Observable::default(),
        }
    }
}

impl<T: Clone> ListModel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.state.read(|s| s.rows.len())
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn get(&self, row: usize) -> Option<T> {
        self.state.read(|s| s.rows.get(row).cloned())
    }

    pub fn rows(&self) -> Vec<T> {
        self.state.read(|s| s.rows.clone())
    }

    /// Borrow the rows without cloning them
    pub fn with_rows<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        self.state.read(|s| f(&s.rows))
    }

    pub fn is_loading(&self) -> bool {
        self.state.read(|s| s.loading)
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.update(|s| s.loading = loading);
    }

    /// Replace all rows
    pub fn reset(&self, rows: Vec<T>) {
        self.state.update(|s| s.rows = rows);
    }

    /// Replace all rows and leave the loading state
    pub fn finish_loading(&self, rows: Vec<T>) {
        self.state.update(|s| {
            s.rows = rows;
            s.loading = false;
        });
    }

    /// Loading ended without data
    pub fn fail_loading(&self) {
        self.finish_loading(Vec::new());
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_loading_replaces_rows() {
        let model = ListModel::new();
        model.reset(vec![1, 2, 3]);
        model.set_loading(true);
        assert!(model.is_loading());

        model.finish_loading(vec![4]);
        assert!(!model.is_loading());
        assert_eq!(model.rows(), vec![4]);
        assert_eq!(model.get(0), Some(4));
        assert_eq!(model.get(1), None);
    }

    #[test]
    fn test_clones_share_rows() {
        let model = ListModel::new();
        let view = model.clone();
        model.reset(vec!["a".to_string()]);
        assert_eq!(view.row_count(), 1);

        model.fail_loading();
        assert!(view.is_empty());
    }
}
