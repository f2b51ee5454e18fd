#[derive(Debug)]
pub struct MissingStartError {
    pub title: String,
}

impl std::fmt::Display for MissingStartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "No start date for event {:?}!", self.title)
    }
}

impl std::error::Error for MissingStartError {}
