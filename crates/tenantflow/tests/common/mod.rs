use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const TWO_CUSTOMERS: &str = r#"
gitlab {
    namespace 1234
}

customer "FirstCustomer" {
    name "First Customer"
}

customer "SecondCustomer" {
    name "Second Customer"
    cloud-infra #true
}
"#;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_manifest(&self, content: &str) {
        let path = self.root.path().join("tenantflow.kdl");
        fs::write(path, content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }
}
