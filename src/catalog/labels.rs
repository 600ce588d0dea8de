//! Label merge rules.
//!
//! Label names are unique within a template. Merging a synthesized label
//! overwrites the value of an existing entry in place so hand-written labels
//! keep their position; unknown names are appended in the order given.

use crate::catalog::model::Label;

/// Insert or overwrite a single label by name.
pub fn upsert_label(labels: &mut Vec<Label>, label: Label) {
    match labels.iter_mut().find(|existing| existing.name == label.name) {
        Some(existing) => existing.value = label.value,
        None => labels.push(label),
    }
}

/// Merge a batch of labels, preserving the batch order for new names.
pub fn merge_labels<I>(labels: &mut Vec<Label>, additions: I)
where
    I: IntoIterator<Item = Label>,
{
    for label in additions {
        upsert_label(labels, label);
    }
}
