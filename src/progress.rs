use std::path::PathBuf;

#[derive(Clone, Debug, Default)]
pub struct ProgressInfo {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub current_file: Option<PathBuf>,
    pub file_total_bytes: u64,
    pub file_copied_bytes: u64,
    pub copied_bytes: u64,
}

impl ProgressInfo {
    pub fn new(total_tasks: usize) -> Self {
        Self { total_tasks, ..Self::default() }
    }

    pub fn start_file(&mut self, path: PathBuf) {
        self.current_file = Some(path);
        self.file_total_bytes = 0;
        self.file_copied_bytes = 0;
    }

    pub fn update_file(&mut self, copied: u64, total: u64) {
        self.file_copied_bytes = copied;
        self.file_total_bytes = total;
    }

    pub fn finish_file(&mut self, bytes: u64) {
        self.copied_bytes += bytes;
        self.completed_tasks += 1;
        self.current_file = None;
    }

    pub fn total_progress(&self) -> f32 {
        if self.total_tasks == 0 { 0.0 } else { self.completed_tasks as f32 / self.total_tasks as f32 }
    }

    pub fn file_progress(&self) -> f32 {
        if self.file_total_bytes == 0 { 0.0 } else { self.file_copied_bytes as f32 / self.file_total_bytes as f32 }
    }
}
