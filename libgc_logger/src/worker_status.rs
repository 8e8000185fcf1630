#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BarColor {
    #[default]
    CYAN,
    GREEN,
    RED,
}

/// Progress message sent from a worker to whoever displays it.
///
/// CYAN while parsing, GREEN once a file was written, RED if the last file failed.
#[derive(Debug, Clone, Default)]
pub struct WorkerStatus {
    pub progress: f32,
    pub file_name: String,
    pub worker_id: usize,
    pub color: BarColor,
}

impl WorkerStatus {
    pub fn new(progress: f32, file_name: &str, worker_id: usize, color: BarColor) -> Self {
        Self {
            progress,
            file_name: file_name.to_string(),
            worker_id,
            color,
        }
    }
}
