use listmap_core::repository::UpdateMethod;

/// A repository call, as recorded by [`MemoryRepository`](crate::MemoryRepository).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Get { list: String, id: i32 },
    GetAll { list: String },
    Find { list: String, row_limit: Option<usize>, position: Option<i32> },
    Create { list: String, id: i32 },
    CreateFolder { list: String, id: i32, name: String },
    CreateFile { list: String, id: i32, name: String },
    Update { list: String, id: i32, method: UpdateMethod },
    Delete { list: String, id: i32 },
    SaveAttachments { list: String, id: i32 },
    SaveFile { list: String, id: i32 },
}

impl Operation {
    /// Whether the call changed the store.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Get { .. } | Self::GetAll { .. } | Self::Find { .. })
    }
}
