pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

/// マニフェストのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "TENANTFLOW_CONFIG_PATH";

/// GitLabネームスペースを上書きする環境変数
pub const GITLAB_NAMESPACE_ENV: &str = "TENANTFLOW_GITLAB_NAMESPACE";

const CANDIDATES: [&str; 2] = ["tenantflow.local.kdl", "tenantflow.kdl"];

/// tenantflowの設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("tenantflow");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// tenantflow.kdl を探す
///
/// 以下の優先順位でマニフェストを検索:
/// 1. 環境変数 TENANTFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: tenantflow.local.kdl, tenantflow.kdl
/// 3. ./.tenantflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/tenantflow/tenantflow.kdl (グローバル設定)
pub fn find_manifest_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    let global_dir = dirs::config_dir().map(|d| d.join("tenantflow"));
    find_manifest_file_from(&current_dir, global_dir.as_deref())
}

/// 指定ディレクトリを起点にマニフェストを探す（2〜4の手順）
pub fn find_manifest_file_from(start: &Path, global_dir: Option<&Path>) -> Result<PathBuf> {
    for filename in &CANDIDATES {
        let path = start.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let local_dir = start.join(".tenantflow");
    if local_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = local_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(global_dir) = global_dir {
        let global_manifest = global_dir.join("tenantflow.kdl");
        if global_manifest.exists() {
            return Ok(global_manifest);
        }
    }

    Err(ConfigError::ManifestNotFound)
}

/// 環境変数からGitLabネームスペースの上書き値を読む
///
/// 未設定なら `None`。整数として読めない値はエラー。
pub fn gitlab_namespace_from_env() -> Result<Option<i64>> {
    match std::env::var(GITLAB_NAMESPACE_ENV) {
        Ok(value) => value
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvVar {
                name: GITLAB_NAMESPACE_ENV.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("tenantflow"));
        assert!(config_dir.exists());
    }

    #[test]
    fn test_find_manifest_in_start_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("tenantflow.kdl"), "// test").unwrap();

        let result = find_manifest_file_from(temp_dir.path(), None).unwrap();
        assert!(result.ends_with("tenantflow.kdl"));
    }

    #[test]
    fn test_find_manifest_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("tenantflow.kdl"), "// shared").unwrap();
        fs::write(temp_dir.path().join("tenantflow.local.kdl"), "// local").unwrap();

        let result = find_manifest_file_from(temp_dir.path(), None).unwrap();

        // tenantflow.local.kdl が優先される
        assert!(result.ends_with("tenantflow.local.kdl"));
    }

    #[test]
    fn test_find_manifest_in_dot_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let local_dir = temp_dir.path().join(".tenantflow");
        fs::create_dir(&local_dir).unwrap();
        fs::write(local_dir.join("tenantflow.kdl"), "// in dot dir").unwrap();

        let result = find_manifest_file_from(temp_dir.path(), None).unwrap();
        assert!(result.ends_with(".tenantflow/tenantflow.kdl"));
    }

    #[test]
    fn test_find_manifest_global_fallback() {
        let temp_dir = tempfile::tempdir().unwrap();
        let global_dir = tempfile::tempdir().unwrap();
        fs::write(global_dir.path().join("tenantflow.kdl"), "// global").unwrap();

        let result = find_manifest_file_from(temp_dir.path(), Some(global_dir.path())).unwrap();
        assert_eq!(result, global_dir.path().join("tenantflow.kdl"));
    }

    #[test]
    fn test_find_manifest_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();

        let result = find_manifest_file_from(temp_dir.path(), None);
        assert!(matches!(result, Err(ConfigError::ManifestNotFound)));
    }

    #[test]
    #[serial]
    fn test_find_manifest_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.kdl");
        fs::write(&config_path, "// custom").unwrap();

        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, config_path.to_str().unwrap());
        }

        let result = find_manifest_file().unwrap();
        assert_eq!(result, config_path);

        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }
    }

    #[test]
    #[serial]
    fn test_find_manifest_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join("tenantflow.kdl"), "// cwd").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = find_manifest_file();
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with("tenantflow.kdl"));
    }

    #[test]
    #[serial]
    fn test_gitlab_namespace_from_env() {
        unsafe {
            std::env::remove_var(GITLAB_NAMESPACE_ENV);
        }
        assert_eq!(gitlab_namespace_from_env().unwrap(), None);

        unsafe {
            std::env::set_var(GITLAB_NAMESPACE_ENV, "4242");
        }
        assert_eq!(gitlab_namespace_from_env().unwrap(), Some(4242));

        unsafe {
            std::env::set_var(GITLAB_NAMESPACE_ENV, "not-a-number");
        }
        assert!(matches!(
            gitlab_namespace_from_env(),
            Err(ConfigError::InvalidEnvVar { .. })
        ));

        unsafe {
            std::env::remove_var(GITLAB_NAMESPACE_ENV);
        }
    }
}
