//! 配置模块，负责加载查询构建器的JSON配置文件

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 默认的配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "query_builder.json";

/// 配置错误
#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "配置错误: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ConfigError {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

/// 查询构建器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderConfig {
    /// selector中文档类型使用的键名
    pub doc_type_field: String,
    /// 预设的文档类型
    pub default_doc_type: Option<String>,
    /// 预设的分页大小
    pub default_limit: Option<i64>,
    /// 排序方向是否转换为小写
    pub lowercase_sort: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            doc_type_field: "docType".to_string(),
            default_doc_type: None,
            default_limit: None,
            lowercase_sort: true,
        }
    }
}

impl BuilderConfig {
    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        // 检查文件是否存在
        if !path_ref.exists() {
            return Err(ConfigError::new(format!(
                "配置文件不存在: {}",
                path_ref.display()
            )));
        }

        let content = fs::read_to_string(path_ref).map_err(|e| {
            ConfigError::new(format!("无法读取配置文件 {}: {}", path_ref.display(), e))
        })?;

        Self::from_json_str(&content).map_err(|e| {
            ConfigError::new(format!("无法解析JSON配置文件 {}: {}", path_ref.display(), e.message))
        })
    }

    /// 从JSON字符串解析配置，缺省的字段使用默认值
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: BuilderConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::new(e.to_string()))?;

        if config.doc_type_field.is_empty() {
            return Err(ConfigError::new("docTypeField 不能为空".to_string()));
        }

        Ok(config)
    }
}
