//! Message-backed task-list storage.

pub mod locks;
pub mod record_codec;
pub mod task_list_repo;
