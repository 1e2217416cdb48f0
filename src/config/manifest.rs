use crate::domain::model::RuntimeName;
use crate::utils::error::{Result, StubError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 預設的執行檔成員名稱
pub const DEFAULT_EXECUTABLE: &str = "python.exe";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub fixture: FixtureConfig,
    #[serde(default)]
    pub runtime: Vec<RuntimeEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureConfig {
    pub name: String,
    pub executable: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeEntry {
    pub archive: String,
    pub stub: Option<String>,
    pub executable: Option<String>,
    pub force: Option<bool>,
}

impl Manifest {
    /// 從 TOML 檔案載入 fixture 清單
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StubError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析 fixture 清單
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StubError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RUNTIME_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證清單的合理性
    pub fn validate_config(&self) -> Result<()> {
        // 驗證 fixture 名稱
        crate::utils::validation::validate_non_empty_string("fixture.name", &self.fixture.name)?;

        if let Some(executable) = &self.fixture.executable {
            crate::utils::validation::validate_member_name("fixture.executable", executable)?;
        }

        if self.runtime.is_empty() {
            return Err(StubError::MissingConfigError {
                field: "runtime".to_string(),
            });
        }

        for (index, entry) in self.runtime.iter().enumerate() {
            let field = format!("runtime[{}].archive", index);
            crate::utils::validation::validate_path(&field, &entry.archive)?;
            crate::utils::validation::validate_runtime_extension(&field, &entry.archive)?;

            // 檔名必須能解析出版本
            RuntimeName::from_path(Path::new(&entry.archive))?;

            if let Some(stub) = &entry.stub {
                crate::utils::validation::validate_path(
                    &format!("runtime[{}].stub", index),
                    stub,
                )?;
            }

            if let Some(executable) = &entry.executable {
                crate::utils::validation::validate_member_name(
                    &format!("runtime[{}].executable", index),
                    executable,
                )?;
            }
        }

        Ok(())
    }

    /// 取得要替換的執行檔成員名稱
    pub fn executable_for<'a>(&'a self, entry: &'a RuntimeEntry) -> &'a str {
        entry
            .executable
            .as_deref()
            .or(self.fixture.executable.as_deref())
            .unwrap_or(DEFAULT_EXECUTABLE)
    }

    /// 取得所有 runtime 項目
    pub fn runtimes(&self) -> &[RuntimeEntry] {
        &self.runtime
    }
}

impl Validate for Manifest {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
