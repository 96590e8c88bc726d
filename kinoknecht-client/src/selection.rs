//! Selection of video files for the next creation action

use kinoknecht_model::VideoFileId;

/// Ordered set of video files chosen by the user.
///
/// Every capture replaces the previous contents. Workflows never read the
/// live selection once started; they work on a [`Selection::snapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    files: Vec<VideoFileId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents, keeping the given order.
    pub fn replace<I>(&mut self, files: I)
    where
        I: IntoIterator<Item = VideoFileId>,
    {
        self.files = files.into_iter().collect();
    }

    /// Replace the contents with exactly one file.
    pub fn select_single(&mut self, file: VideoFileId) {
        self.files = vec![file];
    }

    pub fn snapshot(&self) -> Vec<VideoFileId> {
        self.files.clone()
    }

    pub fn files(&self) -> &[VideoFileId] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// One row checkbox of the file listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkbox {
    pub id: VideoFileId,
    pub checked: bool,
}

/// Row checkboxes in listing order plus the master "tick all" box
#[derive(Debug, Clone, Default)]
pub struct CheckboxGroup {
    items: Vec<Checkbox>,
    all_checked: bool,
}

impl CheckboxGroup {
    /// Unchecked boxes for the given rows; duplicates keep their first position.
    pub fn new<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = VideoFileId>,
    {
        let mut group = Self::default();
        for id in ids {
            group.push(id);
        }
        group
    }

    pub fn push(&mut self, id: VideoFileId) {
        if !self.items.iter().any(|item| item.id == id) {
            self.items.push(Checkbox { id, checked: false });
        }
    }

    /// Tick or untick one row. Returns false if the row is unknown.
    pub fn set_checked(&mut self, id: &VideoFileId, checked: bool) -> bool {
        match self.items.iter_mut().find(|item| &item.id == id) {
            Some(item) => {
                item.checked = checked;
                true
            }
            None => false,
        }
    }

    /// Mirror the master checkbox onto every row.
    pub fn toggle_select_all(&mut self, checked: bool) {
        self.all_checked = checked;
        for item in &mut self.items {
            item.checked = checked;
        }
    }

    /// Ids of the ticked rows in listing order.
    pub fn checked(&self) -> Vec<VideoFileId> {
        self.items
            .iter()
            .filter(|item| item.checked)
            .map(|item| item.id.clone())
            .collect()
    }

    pub fn all_checked(&self) -> bool {
        self.all_checked
    }

    pub fn items(&self) -> &[Checkbox] {
        &self.items
    }
}
