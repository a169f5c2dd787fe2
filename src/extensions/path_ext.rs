use std::path::Path;

pub trait FileName {
    fn string_file_name(&self) -> &str;
}

impl FileName for Path {
    fn string_file_name(&self) -> &str {
        self.file_name().and_then(|s| s.to_str()).unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn string_file_name_returns_the_final_component() {
        assert_eq!(PathBuf::from("/data/credentials/node-5.json").string_file_name(), "node-5.json");
        assert_eq!(PathBuf::from("/").string_file_name(), "unknown");
    }
}
